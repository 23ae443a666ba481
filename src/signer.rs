//! Signer for Aliyun OSS authorization artifacts.

use std::fmt::Write;

use http::Method;
use log::debug;

use crate::config::Config;
use crate::constants::is_sub_resource;
use crate::constants::DEFAULT_ENDPOINT;
use crate::constants::OSS_HEADER_PREFIX;
use crate::credential::Credential;
use crate::time;
use crate::time::DateTime;
use crate::Error;
use crate::Result;

/// Builder for `Signer`.
#[derive(Default)]
pub struct Builder {
    config: Config,
    time: Option<DateTime>,
}

impl Builder {
    /// Specify the full configuration at once.
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Specify access key id.
    pub fn access_key_id(&mut self, access_key_id: &str) -> &mut Self {
        self.config.access_key_id = Some(access_key_id.to_string());
        self
    }

    /// Specify access key secret.
    pub fn access_key_secret(&mut self, access_key_secret: &str) -> &mut Self {
        self.config.access_key_secret = Some(access_key_secret.to_string());
        self
    }

    /// Specify the STS security token.
    pub fn security_token(&mut self, security_token: &str) -> &mut Self {
        self.config.security_token = Some(security_token.to_string());
        self
    }

    /// Specify the service endpoint, e.g. `oss-cn-hangzhou.aliyuncs.com`.
    pub fn endpoint(&mut self, endpoint: &str) -> &mut Self {
        self.config.endpoint = Some(endpoint.to_string());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn time(&mut self, time: DateTime) -> &mut Self {
        self.time = Some(time);
        self
    }

    /// Use existing information to build a new signer.
    ///
    /// The builder should not be used anymore.
    pub fn build(&mut self) -> Result<Signer> {
        let config = self.config.clone();

        let credential = Credential {
            access_key_id: config.access_key_id.clone().unwrap_or_default(),
            access_key_secret: config.access_key_secret.clone().unwrap_or_default(),
            security_token: config.security_token.clone(),
        };
        if !credential.is_valid() {
            return Err(Error::missing_credentials(
                "access key id and access key secret are required",
            ));
        }

        let endpoint = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
        if endpoint.is_empty() {
            return Err(Error::invalid_argument("endpoint must not be empty"));
        }

        Ok(Signer {
            credential,
            endpoint,
            presign_expires_in: config.presign_expires_in,
            policy_expires_in: config.policy_expires_in,
            time: self.time,
        })
    }
}

/// Signer computes signatures binding a method, resource, canonicalized
/// headers and expiry to the configured secret, without transmitting it.
///
/// All methods are pure computations over the inputs and the configured
/// credential; nothing here performs I/O.
#[derive(Debug)]
pub struct Signer {
    pub(crate) credential: Credential,
    pub(crate) endpoint: String,
    pub(crate) presign_expires_in: std::time::Duration,
    pub(crate) policy_expires_in: std::time::Duration,

    time: Option<DateTime>,
}

/// One request to be signed.
#[derive(Debug)]
pub struct SignRequest<'a> {
    /// HTTP method of the intended request.
    pub method: Method,
    /// Target bucket.
    pub bucket: &'a str,
    /// Target object key, in raw (not percent-encoded) form.
    pub object_key: &'a str,
    /// Unix timestamp the signature expires at. Passed through unmodified;
    /// the service rejects expired signatures at request time.
    pub expires: i64,
    /// Headers the eventual request will carry. Only `x-oss-*` ones
    /// participate in canonicalization.
    pub headers: &'a [(String, String)],
    /// Query parameters of the eventual request. Only recognized
    /// sub-resources participate in canonicalization.
    pub query: &'a [(String, String)],
    /// Replace the canonical `/{bucket}/{key}` resource entirely.
    pub resource_override: Option<&'a str>,
}

/// The outcome of signing one request.
#[derive(Debug)]
pub struct SignedOutput {
    /// Access key id the signature was computed for.
    pub access_key_id: String,
    /// Base64 encoded HMAC-SHA1 signature.
    pub signature: String,
    /// The exact string that was signed. Retained for diagnostics and
    /// testing, never transmitted.
    pub string_to_sign: String,
    /// Security token to attach alongside the signature, if any.
    pub security_token: Option<String>,
}

impl Signer {
    /// Create a builder for `Signer`.
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn time_now(&self) -> DateTime {
        self.time.unwrap_or_else(time::now)
    }

    /// Sign one request, producing the signature and the string it covers.
    pub fn sign(&self, req: &SignRequest) -> Result<SignedOutput> {
        match req.method {
            Method::GET | Method::PUT | Method::DELETE | Method::HEAD => {}
            _ => {
                return Err(Error::unsupported_method(format!(
                    "method {} cannot be signed for OSS",
                    req.method
                )))
            }
        }

        let string_to_sign = self.string_to_sign(req)?;
        let signature = crate::hash::base64_hmac_sha1(
            self.credential.access_key_secret.as_bytes(),
            string_to_sign.as_bytes(),
        );

        Ok(SignedOutput {
            access_key_id: self.credential.access_key_id.clone(),
            signature,
            string_to_sign,
            security_token: self.credential.security_token.clone(),
        })
    }

    /// Construct string to sign.
    ///
    /// # Format
    ///
    /// ```text
    ///   VERB + "\n"
    /// + Content-MD5 + "\n"
    /// + Content-Type + "\n"
    /// + Expires + "\n"
    /// + CanonicalizedOSSHeaders
    /// + CanonicalizedResource
    /// ```
    fn string_to_sign(&self, req: &SignRequest) -> Result<String> {
        let mut s = String::new();
        writeln!(&mut s, "{}", req.method.as_str())?;
        writeln!(&mut s, "{}", header_value(req.headers, "content-md5")?)?;
        writeln!(&mut s, "{}", header_value(req.headers, "content-type")?)?;
        writeln!(&mut s, "{}", req.expires)?;

        let headers = canonicalize_headers(req.headers)?;
        if !headers.is_empty() {
            writeln!(&mut s, "{headers}")?;
        }
        write!(&mut s, "{}", self.canonicalize_resource(req))?;

        debug!("string to sign: {}", &s);
        Ok(s)
    }

    /// Build canonicalized resource: `/{bucket}/{key}` plus any recognized
    /// sub-resource query parameters sorted by name. Query signing also
    /// covers the security token.
    fn canonicalize_resource(&self, req: &SignRequest) -> String {
        if let Some(resource) = req.resource_override {
            return resource.to_string();
        }

        let mut params: Vec<(&str, &str)> = req
            .query
            .iter()
            .filter(|(k, _)| is_sub_resource(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(token) = &self.credential.security_token {
            params.push(("security-token", token));
        }
        params.sort();

        let path = format!("/{}/{}", req.bucket, req.object_key);
        if params.is_empty() {
            path
        } else {
            let params_str = params
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.to_string()
                    } else {
                        format!("{k}={v}")
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            format!("{path}?{params_str}")
        }
    }
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Result<&'a str> {
    match headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some((_, v)) => {
            reject_newline(name, v)?;
            Ok(v)
        }
        None => Ok(""),
    }
}

/// Build canonicalized OSS headers: select the `x-oss-*` ones, lowercase
/// the names, sort by name, join as `name:value` lines.
fn canonicalize_headers(headers: &[(String, String)]) -> Result<String> {
    let mut oss_headers = Vec::new();
    for (name, value) in headers {
        reject_newline(name, value)?;
        let name = name.to_lowercase();
        if name.starts_with(OSS_HEADER_PREFIX) {
            oss_headers.push((name, value.clone()));
        }
    }

    oss_headers.sort_by(|x, y| x.0.cmp(&y.0));

    Ok(oss_headers
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

// A newline inside a header value would corrupt canonicalization, so it
// must fail signing instead of producing a signature over garbage.
fn reject_newline(name: &str, value: &str) -> Result<()> {
    if value.contains('\n') || value.contains('\r') {
        return Err(Error::invalid_argument(format!(
            "header {name} value must not contain newline"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hash::base64_decode;
    use crate::hash::base64_hmac_sha1;
    use crate::ErrorKind;

    fn test_signer() -> Signer {
        Signer::builder()
            .access_key_id("access_key_id")
            .access_key_secret("access_key_secret")
            .endpoint("oss-cn-hangzhou.aliyuncs.com")
            .time(Utc.with_ymd_and_hms(2022, 11, 1, 0, 0, 0).unwrap())
            .build()
            .expect("signer must build")
    }

    #[test]
    fn test_string_to_sign() -> Result<()> {
        let signer = test_signer();
        let headers = vec![
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("Content-MD5".to_string(), "abc".to_string()),
            ("x-oss-meta-b".to_string(), "2".to_string()),
            ("X-OSS-Meta-A".to_string(), "1".to_string()),
            ("Cache-Control".to_string(), "no-cache".to_string()),
        ];

        let output = signer.sign(&SignRequest {
            method: Method::PUT,
            bucket: "bucket",
            object_key: "object.txt",
            expires: 1667262864,
            headers: &headers,
            query: &[],
            resource_override: None,
        })?;

        assert_eq!(
            output.string_to_sign,
            "PUT\nabc\ntext/plain\n1667262864\nx-oss-meta-a:1\nx-oss-meta-b:2\n/bucket/object.txt"
        );
        Ok(())
    }

    #[test]
    fn test_signature_matches_reference_algorithm() -> Result<()> {
        let signer = test_signer();
        let output = signer.sign(&SignRequest {
            method: Method::GET,
            bucket: "bucket",
            object_key: "object.txt",
            expires: 1667262864,
            headers: &[],
            query: &[],
            resource_override: None,
        })?;

        // Recompute independently over the documented string-to-sign.
        let expected = base64_hmac_sha1(
            b"access_key_secret",
            b"GET\n\n\n1667262864\n/bucket/object.txt",
        );
        assert_eq!(output.signature, expected);

        // HMAC-SHA1 is 20 bytes.
        assert_eq!(base64_decode(&output.signature)?.len(), 20);
        Ok(())
    }

    #[test]
    fn test_sub_resources_in_resource() -> Result<()> {
        let signer = test_signer();
        let query = vec![
            ("response-content-type".to_string(), "image/jpeg".to_string()),
            ("ignored-param".to_string(), "x".to_string()),
            ("acl".to_string(), String::new()),
        ];

        let output = signer.sign(&SignRequest {
            method: Method::GET,
            bucket: "bucket",
            object_key: "object.txt",
            expires: 1667262864,
            headers: &[],
            query: &query,
            resource_override: None,
        })?;

        assert_eq!(
            output.string_to_sign,
            "GET\n\n\n1667262864\n/bucket/object.txt?acl&response-content-type=image/jpeg"
        );
        Ok(())
    }

    #[test]
    fn test_security_token_in_resource() -> Result<()> {
        let mut builder = Signer::builder();
        let signer = builder
            .access_key_id("access_key_id")
            .access_key_secret("access_key_secret")
            .security_token("sts_token")
            .build()?;

        let output = signer.sign(&SignRequest {
            method: Method::GET,
            bucket: "bucket",
            object_key: "object.txt",
            expires: 1667262864,
            headers: &[],
            query: &[],
            resource_override: None,
        })?;

        assert_eq!(
            output.string_to_sign,
            "GET\n\n\n1667262864\n/bucket/object.txt?security-token=sts_token"
        );
        assert_eq!(output.security_token.as_deref(), Some("sts_token"));
        Ok(())
    }

    #[test]
    fn test_resource_override() -> Result<()> {
        let signer = test_signer();
        let output = signer.sign(&SignRequest {
            method: Method::GET,
            bucket: "bucket",
            object_key: "object.txt",
            expires: 1667262864,
            headers: &[],
            query: &[],
            resource_override: Some("/bucket/object.txt?acl"),
        })?;

        assert_eq!(
            output.string_to_sign,
            "GET\n\n\n1667262864\n/bucket/object.txt?acl"
        );
        Ok(())
    }

    #[test]
    fn test_newline_in_header_value_rejected() {
        let signer = test_signer();
        let headers = vec![("x-oss-meta-a".to_string(), "bad\nvalue".to_string())];

        let err = signer
            .sign(&SignRequest {
                method: Method::PUT,
                bucket: "bucket",
                object_key: "object.txt",
                expires: 1667262864,
                headers: &headers,
                query: &[],
                resource_override: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let signer = test_signer();
        let err = signer
            .sign(&SignRequest {
                method: Method::PATCH,
                bucket: "bucket",
                object_key: "object.txt",
                expires: 1667262864,
                headers: &[],
                query: &[],
                resource_override: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMethod);
    }

    #[test]
    fn test_missing_credentials() {
        let err = Signer::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredentials);

        let err = Signer::builder()
            .access_key_id("access_key_id")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredentials);
    }
}
