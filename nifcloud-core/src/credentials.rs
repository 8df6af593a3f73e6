//! Credential types.
//!
//! Explicit credentials only; resolution chains (environment, profile
//! files, instance metadata) are deliberately not part of this toolkit.

use secrecy::{ExposeSecret, SecretString};

/// An access-key credential set.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    secret_access_key: SecretString,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token,
        }
    }

    /// The secret key, for signing only.
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_deref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("AKID", "s3cret", Some("token".to_string()));
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("token"));
    }
}
