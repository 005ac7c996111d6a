pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use password::CredentialHasher;

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims for `user_id` expiring `expiry_hours` from now.
    ///
    /// Fails when the window does not fit in a timestamp.
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| AuthError::TokenGeneration(format!("expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Password hashing error: {0}")]
    PasswordHashing(String),
}

/// Signs and verifies HS256 bearer tokens with the server secret
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_hours: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_hours,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    /// Issue a token for `user_id` that expires after the configured window
    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.sign(&Claims::new(user_id, self.expiry_hours)?)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Check signature and expiry, returning the subject's user id
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", 168).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let token = issuer.issue(user_id).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn expiry_is_seven_days_from_issue() {
        let claims = Claims::new(Uuid::new_v4(), 168).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn oversized_expiry_is_an_error_not_a_panic() {
        for hours in [1_000_000_000_000_000, u64::MAX] {
            assert!(matches!(
                Claims::new(Uuid::new_v4(), hours),
                Err(AuthError::TokenGeneration(_))
            ));
            let issuer = TokenIssuer::new("test-secret", hours).unwrap();
            assert!(matches!(issuer.issue(Uuid::new_v4()), Err(AuthError::TokenGeneration(_))));
        }
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 8 * 24 * 60 * 60,
            exp: now - 60,
        };
        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let other = TokenIssuer::new("another-secret", 168).unwrap();
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(issuer().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn malformed_token_is_invalid() {
        assert!(matches!(issuer().verify("not.a.jwt"), Err(AuthError::InvalidToken)));
        assert!(matches!(issuer().verify(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenIssuer::new("", 168), Err(AuthError::InvalidSecret)));
    }
}
