//! Post policy and browser-upload form fields.

use std::collections::BTreeMap;
use std::time::Duration;

use log::debug;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::callback::Callback;
use crate::hash::base64_encode;
use crate::hash::base64_hmac_sha1;
use crate::object::FileObject;
use crate::signer::Signer;
use crate::time::format_policy_expiration;
use crate::time::DateTime;
use crate::Error;
use crate::Result;

/// One clause of a post policy's `conditions` list.
///
/// The closed set of variants makes malformed clause shapes
/// unrepresentable; [`InvalidCondition`][crate::ErrorKind::InvalidCondition]
/// remains for clauses that are well-shaped but semantically invalid.
#[derive(Debug, Clone)]
pub enum PolicyCondition {
    /// The named form field must equal the value exactly.
    Eq(String, String),
    /// The named form field must start with the value.
    StartsWith(String, String),
    /// The upload size must fall within `[min, max]` bytes.
    ContentLengthRange(u64, u64),
}

impl PolicyCondition {
    fn validate(&self) -> Result<()> {
        match self {
            PolicyCondition::Eq(field, _) | PolicyCondition::StartsWith(field, _) => {
                if field.is_empty() {
                    return Err(Error::invalid_condition("condition field must not be empty"));
                }
            }
            PolicyCondition::ContentLengthRange(min, max) => {
                if min > max {
                    return Err(Error::invalid_condition(format!(
                        "content-length-range min {min} exceeds max {max}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        match self {
            PolicyCondition::Eq(field, value) => json!(["eq", format!("${field}"), value]),
            PolicyCondition::StartsWith(field, value) => {
                json!(["starts-with", format!("${field}"), value])
            }
            PolicyCondition::ContentLengthRange(min, max) => {
                json!(["content-length-range", min, max])
            }
        }
    }
}

/// Options recognized when building post-object form data.
#[derive(Debug, Default, Clone)]
pub struct PolicyOptions {
    expires_in: Option<Duration>,
    expires_at: Option<DateTime>,
    key_prefix: Option<String>,
    content_length_range: Option<(u64, u64)>,
    callback: Option<Callback>,
    success_action_status: Option<u16>,
    conditions: Vec<PolicyCondition>,
}

impl PolicyOptions {
    /// Expire the policy this long after signing time.
    ///
    /// Defaults to the configured `policy_expires_in`.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Expire the policy at this exact time, overriding `expires_in`.
    pub fn with_expires_at(mut self, expires_at: DateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Constrain the uploaded key to this prefix instead of matching the
    /// FileObject key exactly. The `key` form field becomes
    /// `{prefix}${filename}`, which the browser substitutes.
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = Some(prefix.to_string());
        self
    }

    /// Bound the upload size to `[min, max]` bytes.
    pub fn with_content_length_range(mut self, min: u64, max: u64) -> Self {
        self.content_length_range = Some((min, max));
        self
    }

    /// Attach an upload callback; its encoded form becomes the `callback`
    /// form field.
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Status code the service answers a successful upload with.
    pub fn with_success_action_status(mut self, status: u16) -> Self {
        self.success_action_status = Some(status);
        self
    }

    /// Append an extra condition clause. Clauses keep the order given.
    pub fn with_condition(mut self, condition: PolicyCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Serialize)]
struct PolicyDocument {
    expiration: String,
    conditions: Vec<Value>,
}

impl Signer {
    /// Build the form fields for a direct-from-browser upload: a base64
    /// policy document constraining the upload, its signature, and the
    /// access key id, suitable to embed verbatim in a multipart form.
    ///
    /// Deterministic for identical inputs and an explicit expiration;
    /// never touches the network.
    pub fn post_object_data(
        &self,
        file_object: &FileObject,
        options: &PolicyOptions,
    ) -> Result<BTreeMap<String, String>> {
        let now = self.time_now();
        let expiration = match options.expires_at {
            Some(at) => at,
            None => {
                let ttl = options.expires_in.unwrap_or(self.policy_expires_in);
                let delta = chrono::TimeDelta::from_std(ttl).map_err(|e| {
                    Error::invalid_argument(format!("invalid expiration duration: {e}"))
                })?;
                now + delta
            }
        };
        if expiration <= now {
            return Err(Error::expiration_in_past(format!(
                "policy expiration {expiration} is not after {now}"
            )));
        }

        let mut conditions = vec![json!({ "bucket": file_object.bucket() })];
        match &options.key_prefix {
            Some(prefix) => conditions.push(json!(["starts-with", "$key", prefix])),
            None => conditions.push(json!({ "key": file_object.key() })),
        }
        if let Some((min, max)) = options.content_length_range {
            let clause = PolicyCondition::ContentLengthRange(min, max);
            clause.validate()?;
            conditions.push(clause.to_value());
        }
        for condition in &options.conditions {
            condition.validate()?;
            conditions.push(condition.to_value());
        }

        let policy = serde_json::to_string(&PolicyDocument {
            expiration: format_policy_expiration(expiration),
            conditions,
        })?;
        debug!("post policy: {}", &policy);

        let policy = base64_encode(policy.as_bytes());
        let signature = base64_hmac_sha1(
            self.credential.access_key_secret.as_bytes(),
            policy.as_bytes(),
        );

        let key = match &options.key_prefix {
            Some(prefix) => format!("{prefix}${{filename}}"),
            None => file_object.key().to_string(),
        };

        let mut fields = BTreeMap::new();
        fields.insert("OSSAccessKeyId".to_string(), self.credential.access_key_id.clone());
        fields.insert("policy".to_string(), policy);
        fields.insert("signature".to_string(), signature);
        fields.insert("key".to_string(), key);
        if let Some(token) = &self.credential.security_token {
            fields.insert("x-oss-security-token".to_string(), token.clone());
        }
        if let Some(callback) = &options.callback {
            fields.insert("callback".to_string(), callback.encode()?);
        }
        if let Some(status) = options.success_action_status {
            fields.insert("success_action_status".to_string(), status.to_string());
        }

        Ok(fields)
    }
}
