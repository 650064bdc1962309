//! User management service: registration, authentication, administration

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        profile::{Profile, Role},
        user::{Register, UpdateUser, User, UserClaims, UserQuery, UserShort, USERNAME_RE},
    },
    repository::{users::NewUser, Repository},
    services::email::EmailService,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    email: EmailService,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, email: EmailService) -> Self {
        Self {
            repository,
            config,
            email,
        }
    }

    /// Register a new account. The profile is created in the same
    /// transaction as the user, with the default Member role.
    pub async fn register(&self, payload: Register) -> AppResult<User> {
        payload.validate().map_err(AppError::from_validation)?;

        if !USERNAME_RE.is_match(&payload.username) {
            return Err(AppError::Validation(
                "username: only letters, digits, '_', '.' and '-' are allowed".to_string(),
            ));
        }

        if self.repository.users.username_exists(&payload.username).await? {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                payload.username
            )));
        }

        let hash = self.hash_password(&payload.password)?;
        let user = self
            .repository
            .users
            .create_with_profile(
                &NewUser {
                    username: &payload.username,
                    password_hash: &hash,
                    email: payload.email.as_deref(),
                    firstname: payload.firstname.as_deref(),
                    lastname: payload.lastname.as_deref(),
                    date_of_birth: payload.date_of_birth,
                    is_superuser: false,
                },
                Role::Member,
            )
            .await?;

        tracing::info!("Registered user '{}' (id={})", user.username, user.id);

        // Welcome email is best-effort: a broken SMTP relay must not fail
        // the registration
        if let Some(ref email) = user.email {
            if let Err(e) = self.email.send_welcome(email, &user.username).await {
                tracing::warn!("Failed to send welcome email to {}: {}", email, e);
            }
        }

        Ok(user)
    }

    /// Create a user with an explicit role, skipping when the username is
    /// already taken. Used by seeding.
    pub async fn ensure_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        role: Role,
    ) -> AppResult<User> {
        if let Some(existing) = self.repository.users.get_by_username(username).await? {
            return Ok(existing);
        }

        let hash = self.hash_password(password)?;
        self.repository
            .users
            .create_with_profile(
                &NewUser {
                    username,
                    password_hash: &hash,
                    email,
                    firstname: None,
                    lastname: None,
                    date_of_birth: None,
                    is_superuser: false,
                },
                role,
            )
            .await
    }

    /// Authenticate by username and password, returning a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        // The token carries identity only; role and permissions are looked
        // up per request
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Search users with pagination
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        self.repository.users.search(query).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i32, payload: UpdateUser) -> AppResult<User> {
        payload.validate().map_err(AppError::from_validation)?;

        // 404 before touching anything
        self.repository.users.get_by_id(id).await?;
        self.repository.users.update(id, &payload).await
    }

    /// Delete a user permanently
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await
    }

    /// Reassign a user's role
    pub async fn set_role(&self, user_id: i32, role: Role) -> AppResult<Profile> {
        self.repository.users.get_by_id(user_id).await?;
        let profile = self.repository.users.set_role(user_id, role).await?;
        tracing::info!("User {} role set to {}", user_id, role);
        Ok(profile)
    }

    /// Total number of users, for the admin dashboard
    pub async fn count_users(&self) -> AppResult<i64> {
        self.repository.users.count().await
    }

    /// Hash a password with argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
