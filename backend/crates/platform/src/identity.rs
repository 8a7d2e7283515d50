//! Identity token verification
//!
//! Authentication itself lives with the external identity provider. What
//! reaches this service is a token of the form
//! `base64url(subject).base64url(hmac_sha256(secret, subject))`, minted at
//! the edge with a secret shared with us. Verifying it yields the
//! provider's subject id, which becomes the owner of rate limits and
//! history rows.

use crate::crypto::{constant_time_eq, from_base64_url, hmac_sha256, to_base64_url};

/// Verifies (and, for tooling and tests, mints) identity tokens
#[derive(Clone)]
pub struct IdentityVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl IdentityVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mint a token for `subject`
    pub fn sign(&self, subject: &str) -> String {
        let signature = hmac_sha256(&self.secret, subject.as_bytes());
        format!(
            "{}.{}",
            to_base64_url(subject.as_bytes()),
            to_base64_url(&signature)
        )
    }

    /// Verify a token and return its subject
    ///
    /// Returns `None` for anything malformed, mis-signed, or carrying an
    /// empty subject. Never panics on attacker-controlled input.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (subject_b64, signature_b64) = token.trim().split_once('.')?;

        let subject_bytes = from_base64_url(subject_b64).ok()?;
        let provided_signature = from_base64_url(signature_b64).ok()?;

        let expected_signature = hmac_sha256(&self.secret, &subject_bytes);
        if !constant_time_eq(&provided_signature, &expected_signature) {
            return None;
        }

        let subject = String::from_utf8(subject_bytes).ok()?;
        if subject.trim().is_empty() {
            return None;
        }

        Some(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify() {
        let verifier = IdentityVerifier::new("shared-secret");
        let token = verifier.sign("user_2abcDEF");
        assert_eq!(verifier.verify(&token), Some("user_2abcDEF".to_string()));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let minted = IdentityVerifier::new("secret-a").sign("user_1");
        assert_eq!(IdentityVerifier::new("secret-b").verify(&minted), None);
    }

    #[test]
    fn test_tampered_subject_rejected() {
        let verifier = IdentityVerifier::new("shared-secret");
        let token = verifier.sign("user_1");
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", to_base64_url(b"user_2"), signature);
        assert_eq!(verifier.verify(&forged), None);
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let verifier = IdentityVerifier::new("shared-secret");
        assert_eq!(verifier.verify(""), None);
        assert_eq!(verifier.verify("no-dot"), None);
        assert_eq!(verifier.verify("!!!.???"), None);
        assert_eq!(verifier.verify(&verifier.sign("   ")), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let verifier = IdentityVerifier::new("super-secret");
        assert!(!format!("{verifier:?}").contains("super-secret"));
    }
}
