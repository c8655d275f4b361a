use axum::{extract::State, http::HeaderMap, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::models::user::{default_name, PublicUser, User};
use crate::error::ApiError;
use crate::middleware::auth::extract_bearer_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    pub email: Option<String>,
    pub google_id: Option<String>,
    pub name: Option<String>,
    #[allow(dead_code)]
    pub picture: Option<String>,
}

/// POST /api/auth/register - create an account and issue a token
///
/// 400 when email or password is missing, or when the email is already
/// registered. 201 with `{user, token}` otherwise.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password are required"))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password are required"))?;

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(state.db.pool())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let hashed = auth::hash_password(&password)?;
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name(&email));

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, name) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&email)
    .bind(&hashed)
    .bind(&name)
    .fetch_one(state.db.pool())
    .await?;

    let token = auth::generate_token(&Claims::for_user(&user))?;
    tracing::info!("registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": PublicUser::from(&user), "token": token })),
    ))
}

/// POST /api/auth/login - verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password are required"))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password are required"))?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !auth::verify_password(&password, &user.password) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = auth::generate_token(&Claims::for_user(&user))?;
    Ok(Json(
        json!({ "user": PublicUser::from(&user), "token": token }),
    ))
}

/// POST /api/auth/guest - issue a short-lived token for a synthesized
/// identity; nothing is persisted
pub async fn guest() -> Result<Json<Value>, ApiError> {
    let claims = Claims::for_guest();
    let token = auth::generate_token(&claims)?;
    Ok(Json(
        json!({ "user": PublicUser::guest(&claims), "token": token }),
    ))
}

/// POST /api/auth/verify - decode the bearer token and return its identity
///
/// Guest tokens short-circuit without touching the database; for everyone
/// else the referenced user must still exist.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token =
        extract_bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("No token provided"))?;
    let claims = auth::verify_token(&token)?;

    if claims.is_guest() {
        return Ok(Json(json!({ "user": PublicUser::guest(&claims) })));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(Json(json!({ "user": PublicUser::from(&user) })))
}

/// POST /api/auth/google - find-or-create a user from a Google sign-in
///
/// OAuth-provisioned accounts are stored with an empty password hash, which
/// password login can never match.
pub async fn google(
    State(state): State<AppState>,
    Json(payload): Json<GoogleRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::validation("Email and googleId are required"))?;
    if payload.google_id.as_deref().unwrap_or("").is_empty() {
        return Err(ApiError::validation("Email and googleId are required"));
    }

    let user = match sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(state.db.pool())
        .await?
    {
        Some(user) => user,
        None => {
            let name = payload
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| default_name(&email));
            sqlx::query_as::<_, User>(
                "INSERT INTO users (email, password, name) VALUES ($1, '', $2) RETURNING *",
            )
            .bind(&email)
            .bind(&name)
            .fetch_one(state.db.pool())
            .await?
        }
    };

    let token = auth::generate_token(&Claims::for_user(&user))?;
    Ok(Json(
        json!({ "user": PublicUser::from(&user), "token": token }),
    ))
}
