use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// The authenticated caller. Carries identity only: roles are looked up
/// fresh from storage on every admin-gated call, never cached here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub login: String,
}

impl Principal {
    /// Construct from validated JWT claims at the server boundary.
    /// Core logic never reads raw tokens.
    pub fn from_jwt_claims(claims: &JwtClaims) -> Result<Self, CatalogError> {
        let login = claims
            .sub
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CatalogError::Unauthenticated("missing sub claim".into()))?;
        Ok(Self { login })
    }

    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// JWT claims issued on registration/login and checked by the middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_jwt_claims_happy_path() {
        let claims = JwtClaims {
            sub: Some("alice".into()),
            iat: 0,
            exp: 10,
        };
        let p = Principal::from_jwt_claims(&claims).unwrap();
        assert_eq!(p.login, "alice");
    }

    #[test]
    fn from_jwt_claims_missing_sub() {
        let claims = JwtClaims {
            sub: None,
            iat: 0,
            exp: 10,
        };
        let err = Principal::from_jwt_claims(&claims).unwrap_err();
        assert!(matches!(err, CatalogError::Unauthenticated(_)));
    }

    #[test]
    fn from_jwt_claims_empty_sub() {
        let claims = JwtClaims {
            sub: Some(String::new()),
            iat: 0,
            exp: 10,
        };
        assert!(Principal::from_jwt_claims(&claims).is_err());
    }
}
