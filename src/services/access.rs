//! Per-request authorization: the `Principal` and its typed guards
//!
//! The permission layer and the role layer are independent. Roles gate
//! the dashboard endpoints; permissions gate catalog reads and writes.
//! Holding the Admin role grants no permission by itself; only superusers
//! bypass permission checks.

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        permission::{Permission, PermissionSet},
        profile::Role,
        user::{User, UserClaims},
    },
    repository::Repository,
};

/// Authenticated identity with role and effective permissions, rebuilt
/// from the database on every request so revocations apply immediately.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user: User,
    pub role: Role,
    pub permissions: PermissionSet,
}

impl Principal {
    /// Allow when the principal holds the permission, deny with 403 otherwise
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.permissions.contains(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission {}",
                permission
            )))
        }
    }

    /// Allow when the principal's role matches, deny with 403 otherwise
    pub fn require_role(&self, role: Role) -> AppResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Authorization(format!("{} role required", role)))
        }
    }
}

#[derive(Clone)]
pub struct AccessService {
    repository: Repository,
}

impl AccessService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve validated token claims into a full `Principal`
    pub async fn principal(&self, claims: &UserClaims) -> AppResult<Principal> {
        let user = self
            .repository
            .users
            .get_by_id(claims.user_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    AppError::Authentication("Account no longer exists".to_string())
                }
                other => other,
            })?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let role = self.repository.users.get_profile(user.id).await?.role;
        let granted = self
            .repository
            .permissions
            .effective_permissions(user.id)
            .await?;
        let permissions = PermissionSet::new(granted, user.is_superuser);

        Ok(Principal {
            user,
            role,
            permissions,
        })
    }

    /// List all groups with grants and member counts
    pub async fn list_groups(&self) -> AppResult<Vec<crate::models::permission::GroupDetails>> {
        self.repository.permissions.list_groups().await
    }

    /// Add a user to a group
    pub async fn add_group_member(&self, group_id: i32, user_id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.permissions.add_member(group_id, user_id).await?;
        tracing::info!("User {} added to group {}", user_id, group_id);
        Ok(())
    }

    /// Remove a user from a group
    pub async fn remove_group_member(&self, group_id: i32, user_id: i32) -> AppResult<()> {
        self.repository
            .permissions
            .remove_member(group_id, user_id)
            .await?;
        tracing::info!("User {} removed from group {}", user_id, group_id);
        Ok(())
    }

    /// Grant a permission directly to a user
    pub async fn grant_to_user(&self, user_id: i32, permission: Permission) -> AppResult<()> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository
            .permissions
            .grant_to_user(user_id, permission)
            .await?;
        tracing::info!("Granted {} to user {}", permission, user_id);
        Ok(())
    }

    /// Revoke a direct permission from a user
    pub async fn revoke_from_user(&self, user_id: i32, permission: Permission) -> AppResult<()> {
        self.repository
            .permissions
            .revoke_from_user(user_id, permission)
            .await?;
        tracing::info!("Revoked {} from user {}", permission, user_id);
        Ok(())
    }

    /// Total number of groups, for the admin dashboard
    pub async fn count_groups(&self) -> AppResult<i64> {
        self.repository.permissions.count_groups().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn principal(role: Role, granted: &[Permission], superuser: bool) -> Principal {
        let now = Utc::now();
        Principal {
            user: User {
                id: 1,
                username: "test".to_string(),
                password: String::new(),
                email: None,
                firstname: None,
                lastname: None,
                date_of_birth: None,
                photo: None,
                is_superuser: superuser,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            role,
            permissions: PermissionSet::new(granted.iter().copied().collect::<HashSet<_>>(), superuser),
        }
    }

    #[test]
    fn require_denies_missing_permission() {
        let p = principal(Role::Member, &[Permission::ViewBook], false);
        assert!(p.require(Permission::ViewBook).is_ok());
        assert!(matches!(
            p.require(Permission::EditBook),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn superuser_passes_every_permission_check() {
        let p = principal(Role::Member, &[], true);
        for permission in Permission::all() {
            assert!(p.require(permission).is_ok());
        }
    }

    #[test]
    fn require_role_is_exact() {
        let p = principal(Role::Member, &[], false);
        assert!(p.require_role(Role::Member).is_ok());
        assert!(matches!(
            p.require_role(Role::Admin),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn admin_role_grants_no_permissions() {
        let p = principal(Role::Admin, &[], false);
        assert!(p.require(Permission::DeleteBook).is_err());
    }
}
