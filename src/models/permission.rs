//! Permission layer types: per-book actions, groups, and grants

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Fine-grained book action permission (slug identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "book.view")]
    ViewBook,
    #[serde(rename = "book.create")]
    CreateBook,
    #[serde(rename = "book.edit")]
    EditBook,
    #[serde(rename = "book.delete")]
    DeleteBook,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewBook => "book.view",
            Permission::CreateBook => "book.create",
            Permission::EditBook => "book.edit",
            Permission::DeleteBook => "book.delete",
        }
    }

    /// All defined permissions, in declaration order
    pub fn all() -> [Permission; 4] {
        [
            Permission::ViewBook,
            Permission::CreateBook,
            Permission::EditBook,
            Permission::DeleteBook,
        ]
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "book.view" => Ok(Permission::ViewBook),
            "book.create" => Ok(Permission::CreateBook),
            "book.edit" => Ok(Permission::EditBook),
            "book.delete" => Ok(Permission::DeleteBook),
            _ => Err(format!("Invalid permission slug: {}", s)),
        }
    }
}

// SQLx conversions: permissions are stored as text slugs
impl sqlx::Type<Postgres> for Permission {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Permission {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Permission {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Effective permission set for one identity, rebuilt on every request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    granted: HashSet<Permission>,
    /// Superusers hold every permission implicitly
    superuser: bool,
}

impl PermissionSet {
    pub fn new(granted: HashSet<Permission>, superuser: bool) -> Self {
        Self { granted, superuser }
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.superuser || self.granted.contains(&permission)
    }

    /// Materialized list for API responses, in declaration order
    pub fn to_vec(&self) -> Vec<Permission> {
        Permission::all()
            .into_iter()
            .filter(|p| self.contains(*p))
            .collect()
    }
}

/// Group row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Group {
    pub id: i32,
    pub name: String,
}

/// Group with its grants and member count, for admin listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupDetails {
    pub id: i32,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub member_count: i64,
}

/// Add a user to a group
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddGroupMember {
    pub user_id: i32,
}

/// Grant a direct permission to a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantPermission {
    pub permission: Permission,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_slug_round_trip() {
        for p in Permission::all() {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!("book.publish".parse::<Permission>().is_err());
    }

    #[test]
    fn superuser_holds_every_permission() {
        let set = PermissionSet::new(HashSet::new(), true);
        for p in Permission::all() {
            assert!(set.contains(p));
        }
    }

    #[test]
    fn granted_set_is_exact_for_regular_users() {
        let mut granted = HashSet::new();
        granted.insert(Permission::ViewBook);
        granted.insert(Permission::EditBook);
        let set = PermissionSet::new(granted, false);

        assert!(set.contains(Permission::ViewBook));
        assert!(set.contains(Permission::EditBook));
        assert!(!set.contains(Permission::CreateBook));
        assert!(!set.contains(Permission::DeleteBook));
    }

    #[test]
    fn to_vec_preserves_declaration_order() {
        let mut granted = HashSet::new();
        granted.insert(Permission::DeleteBook);
        granted.insert(Permission::ViewBook);
        let set = PermissionSet::new(granted, false);
        assert_eq!(
            set.to_vec(),
            vec![Permission::ViewBook, Permission::DeleteBook]
        );
    }
}
