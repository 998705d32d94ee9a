//! HS256 tokens (jsonwebtoken) and argon2 password hashes.

use std::time::Duration;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use catalog_core::error::CatalogError;
use catalog_core::ports::{AccessAuthority, Result};
use catalog_core::principal::{JwtClaims, Principal};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

#[derive(Clone)]
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuthority {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl AccessAuthority for JwtAuthority {
    fn issue_token(&self, login: &str, ttl: Duration) -> Result<String> {
        let iat = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: Some(login.to_string()),
            iat,
            exp: iat + ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CatalogError::Storage(anyhow::anyhow!("token signing failed: {e}")))
    }

    fn validate_token(&self, token: &str) -> Result<Principal> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| CatalogError::Unauthenticated(format!("invalid token: {e}")))?;
        Principal::from_jwt_claims(&data.claims)
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| CatalogError::Storage(anyhow::anyhow!("password hashing failed: {e}")))
    }

    fn verify_password(&self, password_hash: &str, password: &str) -> Result<()> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| CatalogError::Unauthenticated(format!("unreadable password hash: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| CatalogError::Unauthenticated("password mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> JwtAuthority {
        JwtAuthority::from_secret(b"unit-test-secret")
    }

    #[test]
    fn issued_token_validates_to_its_login() {
        let auth = authority();
        let token = auth.issue_token("alice", Duration::from_secs(60)).unwrap();
        assert_eq!(auth.validate_token(&token).unwrap(), Principal::new("alice"));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtAuthority::from_secret(b"other")
            .issue_token("alice", Duration::from_secs(60))
            .unwrap();
        let err = authority().validate_token(&token).unwrap_err();
        assert!(matches!(err, CatalogError::Unauthenticated(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = authority();
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: Some("alice".into()),
            iat: now - 120,
            exp: now - 60,
        };
        let token = encode(&Header::default(), &claims, &auth.encoding).unwrap();
        assert!(auth.validate_token(&token).is_err());
        assert!(auth.validate_token("not.a.token").is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let auth = authority();
        let hash = auth.hash_password("secret").unwrap();
        assert_ne!(hash, "secret");
        auth.verify_password(&hash, "secret").unwrap();
        assert!(auth.verify_password(&hash, "wrong").is_err());
        assert!(auth.verify_password("garbage", "secret").is_err());
    }
}
