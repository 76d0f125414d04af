use ring::hmac;
use ring::rand::SystemRandom;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("shared secret is empty")]
    Empty,
    #[error("shared secret not provided")]
    Missing,
    #[error("shared secret mismatch")]
    Mismatch,
    #[error("crypto failure: {0}")]
    Crypto(&'static str),
}

/// Shared secret expected from the alert producer.
///
/// Only an HMAC tag of the secret is kept; comparisons go through
/// `ring::hmac::verify`, which runs in constant time.
pub struct SharedSecret {
    key: hmac::Key,
    tag: hmac::Tag,
}

impl SharedSecret {
    pub fn new(secret: &str) -> Result<Self, SecretError> {
        if secret.trim().is_empty() {
            return Err(SecretError::Empty);
        }
        let rng = SystemRandom::new();
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng)
            .map_err(|_| SecretError::Crypto("failed to generate hmac key"))?;
        let tag = hmac::sign(&key, secret.as_bytes());
        Ok(Self { key, tag })
    }

    pub fn verify(&self, provided: Option<&str>) -> Result<(), SecretError> {
        let provided = provided.ok_or(SecretError::Missing)?;
        hmac::verify(&self.key, provided.as_bytes(), self.tag.as_ref())
            .map_err(|_| SecretError::Mismatch)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_secret() {
        let secret = SharedSecret::new("radar-s3cret").unwrap();
        assert_eq!(secret.verify(Some("radar-s3cret")), Ok(()));
    }

    #[test]
    fn rejects_wrong_or_missing_secret() {
        let secret = SharedSecret::new("radar-s3cret").unwrap();
        assert_eq!(secret.verify(Some("radar-s3cre")), Err(SecretError::Mismatch));
        assert_eq!(secret.verify(Some("")), Err(SecretError::Mismatch));
        assert_eq!(secret.verify(None), Err(SecretError::Missing));
    }

    #[test]
    fn empty_secret_cannot_be_configured() {
        assert_eq!(SharedSecret::new("  ").unwrap_err(), SecretError::Empty);
    }

    #[test]
    fn debug_does_not_leak() {
        let secret = SharedSecret::new("radar-s3cret").unwrap();
        assert!(!format!("{secret:?}").contains("s3cret"));
    }
}
