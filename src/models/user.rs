//! User identity and related types

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// A user holding a relation to a book, as shown in the `readers` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reader {
    pub first_name: String,
    pub last_name: String,
}

/// Upper bound on token lifetime, ten years
const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365 * 10;

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub user_id: i32,
    #[serde(default)]
    pub is_staff: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn new(user_id: i32, username: &str, is_staff: bool, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let hours = i64::try_from(expiration_hours)
            .unwrap_or(MAX_TOKEN_LIFETIME_HOURS)
            .min(MAX_TOKEN_LIFETIME_HOURS);
        let ttl = Duration::try_hours(hours).unwrap_or_else(Duration::zero);
        Self {
            sub: username.to_string(),
            user_id,
            is_staff,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Owners and staff may modify a book; unowned books are staff-only
    pub fn can_modify(&self, owner_id: Option<i32>) -> bool {
        self.is_staff || owner_id == Some(self.user_id)
    }

    pub fn require_owner_or_staff(&self, owner_id: Option<i32>) -> Result<(), AppError> {
        if self.can_modify(owner_id) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}
