//! Password hashing and session tokens.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TOKEN_VALIDITY_SECS: i64 = 24 * 60 * 60;

mod skillshare_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
        Argon2,
    };

    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
            .map_err(|err| anyhow!("{}", err))?;
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

/// Hashes a password into a salted PHC string.
pub fn hash_password(plain: &str) -> Result<String> {
    skillshare_argon2::hash(plain.as_bytes())
}

/// Returns Ok(false) on mismatch, Err only if the stored hash is malformed.
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool> {
    skillshare_argon2::verify(plain.as_bytes(), stored_hash)
}

/// Random alphanumeric secret used when none is configured.
pub fn generate_secret() -> String {
    let rng = rand::rng();
    rng.sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 session tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: usize, now: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + TOKEN_VALIDITY_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }

    /// Returns the user id for a valid token, None for anything else.
    pub fn verify(&self, token: &str) -> Option<usize> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims.sub.parse().ok(),
            Err(err) => {
                debug!("Rejected session token: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::unix_now;

    #[test]
    fn hashes_and_verifies_password() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
        assert!(verify_password("s3cret!", "not-a-phc-string").is_err());
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("abc123").unwrap(), hash_password("abc123").unwrap());
    }

    #[test]
    fn token_round_trip() {
        let issuer = TokenIssuer::new(b"test-secret-test-secret");
        let token = issuer.issue(42, unix_now()).unwrap();
        assert_eq!(issuer.verify(&token), Some(42));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new(b"test-secret-test-secret");
        let token = issuer
            .issue(42, unix_now() - TOKEN_VALIDITY_SECS - 60)
            .unwrap();
        assert_eq!(issuer.verify(&token), None);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let issuer = TokenIssuer::new(b"test-secret-test-secret");
        let other = TokenIssuer::new(b"another-secret-entirely");
        let token = other.issue(42, unix_now()).unwrap();
        assert_eq!(issuer.verify(&token), None);
        assert_eq!(issuer.verify("garbage"), None);
    }

    #[test]
    fn generated_secret_is_alphanumeric() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
