use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config;

pub mod tier;

pub use tier::Tier;

/// Session token claims. Only the subject is trusted; role and practice
/// membership are re-read from the user record on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// The authenticated actor for the duration of one request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub tier: Tier,
    /// Home practice; super admins may have none.
    pub practice_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token generation failed: {0}")]
    Generation(String),
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("JWT secret not configured")]
    MissingSecret,
}

pub fn issue_token(user_id: Uuid) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let claims = Claims::new(user_id);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| TokenError::Invalid(e.to_string()))
}

/// Hex SHA-256 digest of a password, matching the `users.password_hash`
/// column format.
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_digest_is_stable_hex() {
        let digest = password_digest("geheim");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, password_digest("geheim"));
        assert_ne!(digest, password_digest("geheim2"));
    }

    #[test]
    fn issued_token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id).expect("issue");
        let claims = verify_token(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_token("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue_token(Uuid::new_v4()).expect("issue");
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(&tampered).is_err());
    }
}
