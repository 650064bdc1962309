//! User model and related types

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Accepted username shape: letters, digits, and `_ . -`
pub static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username regex"));

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Path or URL of the profile photo
    pub photo: Option<String>,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short user representation for admin listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Self-service registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct Register {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Admin update of an existing user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub photo: Option<String>,
    pub is_active: Option<bool>,
}

/// JWT claims: identity only. Role and permissions are reloaded from the
/// database on every request so grants are never cached in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use validator::Validate;

    #[test]
    fn username_regex_accepts_common_shapes() {
        for name in ["alice", "bob_42", "jane.doe", "mary-ann"] {
            assert!(USERNAME_RE.is_match(name), "{} should match", name);
        }
    }

    #[test]
    fn username_regex_rejects_whitespace_and_symbols() {
        for name in ["alice bob", "eve!", "x@y", ""] {
            assert!(!USERNAME_RE.is_match(name), "{} should not match", name);
        }
    }

    #[test]
    fn register_rejects_short_password() {
        let payload = Register {
            username: "alice".to_string(),
            password: "short".to_string(),
            email: None,
            firstname: None,
            lastname: None,
            date_of_birth: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn register_rejects_bad_email() {
        let payload = Register {
            username: "alice".to_string(),
            password: "longenough".to_string(),
            email: Some("not-an-email".to_string()),
            firstname: None,
            lastname: None,
            date_of_birth: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn claims_round_trip_through_token() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "alice".to_string(),
            user_id: 7,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("test-secret").unwrap();
        let parsed = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.sub, "alice");
        assert_eq!(parsed.user_id, 7);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "alice".to_string(),
            user_id: 7,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
