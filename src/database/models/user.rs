use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{Claims, ROLE_GUEST};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// bcrypt hash; empty string for OAuth-provisioned accounts
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The identity subset returned by auth endpoints. Guests have no email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: Some(user.email.clone()),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

impl PublicUser {
    pub fn guest(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: None,
            name: "Guest".to_string(),
            role: ROLE_GUEST.to_string(),
        }
    }
}

/// Fallback display name when registration omits one: the email local part.
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
