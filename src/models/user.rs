//! User model and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Stored user account
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Canonical (trimmed, lower-cased) email, unique across users
    pub email: String,
    pub name: Option<String>,
    /// Present only for credential-based accounts
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Data needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// Verified identity of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Canonical form used for every email lookup: trimmed and lower-cased
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize and validate an email address
pub fn parse_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !email.validate_email() {
        return Err(AppError::Validation("Invalid input data".to_string()));
    }
    Ok(email)
}

/// Display name used when signup does not provide one
pub fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// JWT claims carried by the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_identity(identity: &Identity, issued_at: i64, expires_at: i64) -> Self {
        Self {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// Create a new signed JWT
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT; expiry is checked without leeway
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let mut validation = Validation::default();
        validation.leeway = 0;
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}
