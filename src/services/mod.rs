//! Business logic services

pub mod access;
pub mod catalog;
pub mod email;
pub mod seed;
pub mod users;

use crate::{
    config::{AuthConfig, EmailConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub access: access::AccessService,
    pub catalog: catalog::CatalogService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, email_config: EmailConfig) -> Self {
        let email = email::EmailService::new(email_config);
        Self {
            users: users::UsersService::new(repository.clone(), auth_config, email.clone()),
            access: access::AccessService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository),
            email,
        }
    }
}
