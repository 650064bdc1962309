//! Permissions repository: groups, memberships, and direct grants

use sqlx::{Pool, Postgres};
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::permission::{Group, GroupDetails, Permission},
    repository::is_foreign_key_violation,
};

#[derive(Clone)]
pub struct PermissionsRepository {
    pool: Pool<Postgres>,
}

impl PermissionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Effective permission set of a user: union of all group grants and
    /// direct grants. Queried fresh on every request.
    pub async fn effective_permissions(&self, user_id: i32) -> AppResult<HashSet<Permission>> {
        let slugs: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT permission FROM user_permissions WHERE user_id = $1
            UNION
            SELECT gp.permission
            FROM group_permissions gp
            JOIN user_groups ug ON ug.group_id = gp.group_id
            WHERE ug.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut permissions = HashSet::new();
        for slug in slugs {
            match slug.parse::<Permission>() {
                Ok(p) => {
                    permissions.insert(p);
                }
                Err(_) => {
                    tracing::warn!("Ignoring unknown permission slug in database: {}", slug);
                }
            }
        }

        Ok(permissions)
    }

    /// List all groups with their grants and member counts
    pub async fn list_groups(&self) -> AppResult<Vec<GroupDetails>> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, name FROM groups ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut details = Vec::with_capacity(groups.len());
        for group in groups {
            let permissions: Vec<Permission> = sqlx::query_scalar::<_, String>(
                "SELECT permission FROM group_permissions WHERE group_id = $1 ORDER BY permission",
            )
            .bind(group.id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter_map(|s| s.parse().ok())
            .collect();

            let member_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM user_groups WHERE group_id = $1")
                    .bind(group.id)
                    .fetch_one(&self.pool)
                    .await?;

            details.push(GroupDetails {
                id: group.id,
                name: group.name,
                permissions,
                member_count,
            });
        }

        Ok(details)
    }

    /// Get a group by name, used by seeding
    pub async fn get_group_by_name(&self, name: &str) -> AppResult<Group> {
        sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group '{}' not found", name)))
    }

    /// Add a user to a group
    pub async fn add_member(&self, group_id: i32, user_id: i32) -> AppResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Group or user not found".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "User {} is already a member of group {}",
                user_id, group_id
            )));
        }

        Ok(())
    }

    /// Remove a user from a group
    pub async fn remove_member(&self, group_id: i32, user_id: i32) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM user_groups WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of group {}",
                user_id, group_id
            )));
        }

        Ok(())
    }

    /// Grant a permission directly to a user
    pub async fn grant_to_user(&self, user_id: i32, permission: Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission) VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(permission)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound(format!("User with id {} not found", user_id))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(())
    }

    /// Revoke a direct permission from a user. Group grants are unaffected.
    pub async fn revoke_from_user(&self, user_id: i32, permission: Permission) -> AppResult<()> {
        let deleted =
            sqlx::query("DELETE FROM user_permissions WHERE user_id = $1 AND permission = $2")
                .bind(user_id)
                .bind(permission)
                .execute(&self.pool)
                .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} holds no direct grant of {}",
                user_id, permission
            )));
        }

        Ok(())
    }

    /// Total number of groups, for the admin dashboard
    pub async fn count_groups(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
