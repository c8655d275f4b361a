use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::user::User;
use crate::error::ApiError;

pub const ROLE_USER: &str = "user";
pub const ROLE_GUEST: &str = "guest";

/// Bearer-token claims. `sub` holds the user id for persisted users and a
/// synthesized `guest-<hex>` identifier for guest sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_user(user: &User) -> Self {
        Self::new(
            user.id.to_string(),
            Some(user.email.clone()),
            user.role.clone(),
            config::config().security.jwt_expiry_hours,
        )
    }

    /// Guest claims carry no email and a shorter validity window; nothing is
    /// persisted for them.
    pub fn for_guest() -> Self {
        let guest_id = format!("guest-{}", &Uuid::new_v4().simple().to_string()[..8]);
        Self::new(
            guest_id,
            None,
            ROLE_GUEST.to_string(),
            config::config().security.guest_expiry_hours,
        )
    }

    fn new(sub: String, email: Option<String>, role: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub,
            email,
            role,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.role == ROLE_GUEST
    }

    /// Persisted-user id from `sub`. Guest subjects are not UUIDs, so guest
    /// tokens are rejected here rather than failing on a database lookup.
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::forbidden("Guest accounts cannot access this resource"))
    }
}

/// Sign claims into a bearer token using the configured secret.
pub fn generate_token(claims: &Claims) -> Result<String, ApiError> {
    encode_with_secret(claims, &config::config().security.jwt_secret)
}

/// Decode and verify a bearer token using the configured secret.
pub fn verify_token(token: &str) -> Result<Claims, ApiError> {
    decode_with_secret(token, &config::config().security.jwt_secret)
}

fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    if secret.is_empty() {
        tracing::error!("JWT secret not configured");
        return Err(ApiError::internal("Token generation failed"));
    }
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal("Token generation failed")
    })
}

fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, ApiError> {
    if secret.is_empty() {
        tracing::error!("JWT secret not configured");
        return Err(ApiError::unauthorized("Invalid token"));
    }
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::unauthorized("Invalid token"))
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::internal("Registration failed")
    })
}

/// Verify a password against a stored hash. An empty stored hash marks an
/// OAuth-provisioned account, which can never match a password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if hash.is_empty() {
        return false;
    }
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trip_preserves_claims() {
        let claims = Claims::new(
            "2a9f4b1c-0000-4000-8000-1234567890ab".to_string(),
            Some("alice@example.com".to_string()),
            ROLE_USER.to_string(),
            24,
        );
        let token = encode_with_secret(&claims, SECRET).unwrap();
        let decoded = decode_with_secret(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email.as_deref(), Some("alice@example.com"));
        assert_eq!(decoded.role, ROLE_USER);
        assert!(!decoded.is_guest());
        assert!(decoded.user_id().is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new("someone".to_string(), None, ROLE_USER.to_string(), 24);
        let token = encode_with_secret(&claims, SECRET).unwrap();
        assert!(decode_with_secret(&token, "other-secret").is_err());
    }

    #[test]
    fn guest_claims_have_guest_role_and_no_persisted_id() {
        let claims = Claims::for_guest();
        assert!(claims.is_guest());
        assert!(claims.sub.starts_with("guest-"));
        assert!(claims.email.is_none());
        // guest-<hex> never parses as a UUID, so DB-backed routes reject it
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn password_verify_rejects_empty_oauth_hash() {
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }
}
