use std::env;
use std::time::Duration;

use crate::constants::*;

/// Config carries all the configuration needed to produce artifacts.
///
/// Configuration is read-only for the lifetime of a signer; load it once
/// at startup and pass it by value.
#[derive(Clone, Debug)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `access_key_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_SECRET`]
    pub access_key_secret: Option<String>,
    /// `security_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_SECURITY_TOKEN`]
    pub security_token: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OSS_ENDPOINT`]
    /// - default: `oss-cn-hangzhou.aliyuncs.com`
    pub endpoint: Option<String>,
    /// Default TTL for presigned URLs when the caller doesn't pick one.
    pub presign_expires_in: Duration,
    /// Default TTL for post policies when the caller doesn't pick one.
    pub policy_expires_in: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            access_key_secret: None,
            security_token: None,
            endpoint: None,
            presign_expires_in: DEFAULT_PRESIGN_EXPIRES_IN,
            policy_expires_in: DEFAULT_POLICY_EXPIRES_IN,
        }
    }
}

impl Config {
    /// Load config from env. Fields already set take precedence.
    pub fn from_env(mut self) -> Self {
        if let Ok(v) = env::var(ALIBABA_CLOUD_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Ok(v) = env::var(ALIBABA_CLOUD_ACCESS_KEY_SECRET) {
            self.access_key_secret.get_or_insert(v);
        }
        if let Ok(v) = env::var(ALIBABA_CLOUD_SECURITY_TOKEN) {
            self.security_token.get_or_insert(v);
        }
        if let Ok(v) = env::var(OSS_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (ALIBABA_CLOUD_ACCESS_KEY_ID, Some("env_key")),
                (ALIBABA_CLOUD_ACCESS_KEY_SECRET, Some("env_secret")),
                (OSS_ENDPOINT, Some("oss-cn-beijing.aliyuncs.com")),
            ],
            || {
                let cfg = Config::default().from_env();
                assert_eq!(cfg.access_key_id.as_deref(), Some("env_key"));
                assert_eq!(cfg.access_key_secret.as_deref(), Some("env_secret"));
                assert_eq!(cfg.security_token, None);
                assert_eq!(
                    cfg.endpoint.as_deref(),
                    Some("oss-cn-beijing.aliyuncs.com")
                );
            },
        );
    }

    #[test]
    fn test_explicit_fields_win_over_env() {
        temp_env::with_vars([(ALIBABA_CLOUD_ACCESS_KEY_ID, Some("env_key"))], || {
            let cfg = Config {
                access_key_id: Some("explicit_key".to_string()),
                ..Default::default()
            }
            .from_env();
            assert_eq!(cfg.access_key_id.as_deref(), Some("explicit_key"));
        });
    }
}
