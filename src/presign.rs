//! Presigned URL construction.

use std::fmt::Write;
use std::time::Duration;

use http::Method;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::object::FileObject;
use crate::signer::SignRequest;
use crate::signer::Signer;
use crate::time::DateTime;
use crate::Error;
use crate::Result;

/// Characters kept verbatim when encoding an object key into a URL path.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Options recognized when presigning a URL.
#[derive(Debug, Default, Clone)]
pub struct PresignOptions {
    expires_in: Option<Duration>,
    expires_at: Option<DateTime>,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl PresignOptions {
    /// Expire the URL this long after signing time.
    ///
    /// Defaults to the configured `presign_expires_in`.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Expire the URL at this exact time, overriding `expires_in`.
    ///
    /// Identical inputs with an explicit expiry produce byte-identical URLs.
    pub fn with_expires_at(mut self, expires_at: DateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Add a header the eventual request will carry. Only `x-oss-*` headers
    /// participate in signing; the caller must still send them.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter to the final URL. Recognized sub-resources
    /// (e.g. `response-content-type`) also participate in signing.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }
}

impl Signer {
    /// Produce a fully-qualified URL embedding signature, expiry and access
    /// key id, granting `method` on the target without exposing the secret.
    ///
    /// Only GET, PUT and HEAD can be presigned. DELETE via presigned URL is
    /// not supported by every service configuration, so it is rejected with
    /// `UnsupportedMethod` rather than silently permitted.
    ///
    /// The URL is computed locally: no network I/O happens and the bucket or
    /// key are not checked for existence.
    pub fn presigned_url(
        &self,
        method: Method,
        file_object: &FileObject,
        options: &PresignOptions,
    ) -> Result<String> {
        match method {
            Method::GET | Method::PUT | Method::HEAD => {}
            _ => {
                return Err(Error::unsupported_method(format!(
                    "method {method} cannot be presigned"
                )))
            }
        }

        let expires = match options.expires_at {
            Some(at) => at.timestamp(),
            None => {
                let ttl = options.expires_in.unwrap_or(self.presign_expires_in);
                let delta = chrono::TimeDelta::from_std(ttl).map_err(|e| {
                    Error::invalid_argument(format!("invalid expiration duration: {e}"))
                })?;
                (self.time_now() + delta).timestamp()
            }
        };

        let output = self.sign(&SignRequest {
            method,
            bucket: file_object.bucket(),
            object_key: file_object.key(),
            expires,
            headers: &options.headers,
            query: &options.query,
            resource_override: None,
        })?;

        let mut url = format!(
            "https://{}.{}/{}",
            file_object.bucket(),
            self.endpoint,
            utf8_percent_encode(file_object.key(), KEY_ENCODE_SET),
        );
        write!(url, "?OSSAccessKeyId={}", output.access_key_id)?;
        write!(url, "&Expires={expires}")?;
        write!(
            url,
            "&Signature={}",
            utf8_percent_encode(&output.signature, NON_ALPHANUMERIC)
        )?;
        if let Some(token) = &output.security_token {
            write!(
                url,
                "&security-token={}",
                utf8_percent_encode(token, NON_ALPHANUMERIC)
            )?;
        }
        for (name, value) in &options.query {
            write!(
                url,
                "&{name}={}",
                utf8_percent_encode(value, NON_ALPHANUMERIC)
            )?;
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hash::base64_hmac_sha1;
    use crate::ErrorKind;

    fn test_signer() -> Signer {
        let mut builder = Signer::builder();
        builder
            .access_key_id("access_key_id")
            .access_key_secret("access_key_secret")
            .endpoint("oss-cn-hangzhou.aliyuncs.com");
        builder.build().expect("signer must build")
    }

    fn expires_2030() -> DateTime {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_presigned_url_layout() -> Result<()> {
        let signer = test_signer();
        let object = FileObject::new("bucket", "photos/a b.jpg");
        let options = PresignOptions::default().with_expires_at(expires_2030());

        let url = signer.presigned_url(Method::GET, &object, &options)?;

        let expires = expires_2030().timestamp();
        let signature = base64_hmac_sha1(
            b"access_key_secret",
            format!("GET\n\n\n{expires}\n/bucket/photos/a b.jpg").as_bytes(),
        );
        let expected = format!(
            "https://bucket.oss-cn-hangzhou.aliyuncs.com/photos/a%20b.jpg\
             ?OSSAccessKeyId=access_key_id&Expires={expires}&Signature={}",
            utf8_percent_encode(&signature, NON_ALPHANUMERIC)
        );
        assert_eq!(url, expected);
        Ok(())
    }

    #[test]
    fn test_presigned_url_is_deterministic() -> Result<()> {
        let signer = test_signer();
        let object = FileObject::new("bucket", "a/b.jpg");
        let options = PresignOptions::default().with_expires_at(expires_2030());

        let first = signer.presigned_url(Method::PUT, &object, &options)?;
        let second = signer.presigned_url(Method::PUT, &object, &options)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_presigned_url_with_security_token() -> Result<()> {
        let mut builder = Signer::builder();
        builder
            .access_key_id("access_key_id")
            .access_key_secret("access_key_secret")
            .security_token("token/+=");
        let signer = builder.build()?;

        let object = FileObject::new("bucket", "a.txt");
        let options = PresignOptions::default().with_expires_at(expires_2030());

        let url = signer.presigned_url(Method::GET, &object, &options)?;
        assert!(url.contains("&security-token=token%2F%2B%3D"));
        Ok(())
    }

    #[test]
    fn test_extra_query_appended() -> Result<()> {
        let signer = test_signer();
        let object = FileObject::new("bucket", "a.txt");
        let options = PresignOptions::default()
            .with_expires_at(expires_2030())
            .with_query("response-content-type", "image/jpeg");

        let url = signer.presigned_url(Method::GET, &object, &options)?;
        assert!(url.ends_with("&response-content-type=image%2Fjpeg"));
        Ok(())
    }

    #[test]
    fn test_delete_cannot_be_presigned() {
        let signer = test_signer();
        let object = FileObject::new("bucket", "a.txt");

        let err = signer
            .presigned_url(Method::DELETE, &object, &PresignOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMethod);
    }
}
