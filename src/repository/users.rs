//! Users repository for database operations

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        profile::{Profile, Role},
        user::{UpdateUser, User, UserQuery, UserShort},
    },
    repository::is_unique_violation,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

/// Fields persisted when creating a user
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: Option<&'a str>,
    pub firstname: Option<&'a str>,
    pub lastname: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_superuser: bool,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (primary authentication method)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a user together with its profile, in one transaction.
    /// Creating the profile here (instead of a hidden post-save hook) keeps
    /// the one-profile-per-user invariant visible at the call site.
    pub async fn create_with_profile(&self, user: &NewUser<'_>, role: Role) -> AppResult<User> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (
                username, password, email, firstname, lastname,
                date_of_birth, is_superuser, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
            "#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.email)
        .bind(user.firstname)
        .bind(user.lastname)
        .bind(user.date_of_birth)
        .bind(user.is_superuser)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Username '{}' is already taken", user.username))
            } else {
                AppError::Database(e)
            }
        })?;

        sqlx::query("INSERT INTO profiles (user_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(role)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Get the profile attached to a user
    pub async fn get_profile(&self, user_id: i32) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user_id)))
    }

    /// Reassign a user's role
    pub async fn set_role(&self, user_id: i32, role: Role) -> AppResult<Profile> {
        let updated = sqlx::query("UPDATE profiles SET role = $1 WHERE user_id = $2")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Profile for user {} not found",
                user_id
            )));
        }

        self.get_profile(user_id).await
    }

    /// Search users with pagination, joined with their role
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let pattern = query
            .name
            .as_ref()
            .map(|name| format!("%{}%", name.to_lowercase()));

        let total: i64 = if let Some(ref pattern) = pattern {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM users
                WHERE LOWER(username) LIKE $1
                   OR LOWER(COALESCE(firstname, '')) LIKE $1
                   OR LOWER(COALESCE(lastname, '')) LIKE $1
                "#,
            )
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(&self.pool)
                .await?
        };

        let select = r#"
            SELECT u.id, u.username, u.firstname, u.lastname, p.role, u.is_active
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
        "#;

        let users = if let Some(ref pattern) = pattern {
            sqlx::query_as::<_, UserShort>(&format!(
                r#"
                {select}
                WHERE LOWER(u.username) LIKE $1
                   OR LOWER(COALESCE(u.firstname, '')) LIKE $1
                   OR LOWER(COALESCE(u.lastname, '')) LIKE $1
                ORDER BY u.username
                LIMIT $2 OFFSET $3
                "#
            ))
            .bind(pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, UserShort>(&format!(
                "{select} ORDER BY u.username LIMIT $1 OFFSET $2"
            ))
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        Ok((users, total))
    }

    /// Update an existing user
    pub async fn update(&self, id: i32, user: &UpdateUser) -> AppResult<User> {
        let now = Utc::now();

        // Build dynamic update query
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(user.email, "email");
        add_field!(user.firstname, "firstname");
        add_field!(user.lastname, "lastname");
        add_field!(user.date_of_birth, "date_of_birth");
        add_field!(user.photo, "photo");
        add_field!(user.is_active, "is_active");

        let _ = param_idx;

        let query = format!("UPDATE users SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(user.email);
        bind_field!(user.firstname);
        bind_field!(user.lastname);
        bind_field!(user.date_of_birth);
        bind_field!(user.photo);
        bind_field!(user.is_active);

        builder.execute(&self.pool).await?;

        self.get_by_id(id).await
    }

    /// Delete a user permanently. The profile row cascades.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Total number of users, for the admin dashboard
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
