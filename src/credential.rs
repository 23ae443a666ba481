use std::fmt::Debug;
use std::fmt::Formatter;

/// Credential that holds the access key id and secret.
#[derive(Default, Clone)]
pub struct Credential {
    /// Access key id for aliyun services.
    pub access_key_id: String,
    /// Access key secret for aliyun services.
    pub access_key_secret: String,
    /// Security token for aliyun services, issued by STS.
    pub security_token: Option<String>,
}

impl Credential {
    /// Whether this credential is complete enough to sign with.
    pub fn is_valid(&self) -> bool {
        !self.access_key_id.is_empty() && !self.access_key_secret.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &redact(&self.access_key_id))
            .field("access_key_secret", &redact(&self.access_key_secret))
            .field(
                "security_token",
                &self.security_token.as_deref().map(redact),
            )
            .finish()
    }
}

fn redact(value: &str) -> String {
    if value.len() <= 2 {
        "***".to_string()
    } else {
        let mut s = String::new();
        s.push(value.as_bytes()[0] as char);
        s.push_str("***");
        s.push(value.as_bytes()[value.len() - 1] as char);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential {
            access_key_id: "LTAI4GExample".to_string(),
            access_key_secret: "SuperSecretValue".to_string(),
            security_token: Some("StsToken".to_string()),
        };

        let repr = format!("{cred:?}");
        assert!(!repr.contains("SuperSecretValue"));
        assert!(!repr.contains("StsToken"));
        assert!(repr.contains("L***e"));
        assert!(repr.contains("S***e"));
        assert!(repr.contains("S***n"));
    }

    #[test]
    fn test_is_valid() {
        assert!(!Credential::default().is_valid());

        let cred = Credential {
            access_key_id: "id".to_string(),
            access_key_secret: "secret".to_string(),
            security_token: None,
        };
        assert!(cred.is_valid());
    }
}
