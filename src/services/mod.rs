//! Business logic services

pub mod catalog;
pub mod media;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, media: media::MediaStore) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), media),
            users: users::UsersService::new(repository, auth_config),
        }
    }
}
