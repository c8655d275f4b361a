use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Authenticated caller context extracted from the bearer token.
///
/// Fail-closed variant: a missing or invalid token rejects the request
/// with 401 before the handler runs.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    /// Persisted-user id of the caller; guests are turned away with 403.
    pub fn user_id(&self) -> Result<uuid::Uuid, ApiError> {
        self.claims.user_id()
    }
}

/// Fail-open variant: an absent token yields `OptionalAuthUser(None)` and the
/// handler proceeds unauthenticated. An invalid token is also treated as
/// absent rather than rejected.
#[derive(Clone, Debug)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("No token provided"))?;
        let claims = auth::verify_token(&token)?;
        Ok(AuthUser { claims })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = extract_bearer_token(&parts.headers)
            .and_then(|token| auth::verify_token(&token).ok())
            .map(|claims| AuthUser { claims });
        Ok(OptionalAuthUser(user))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
