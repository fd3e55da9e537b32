//! Business logic services

pub mod auth;
pub mod authors;
pub mod catalog;
pub mod loans;
pub mod redis;
pub mod renewal;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub authors: authors::AuthorsService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub redis: redis::RedisService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, redis_service: redis::RedisService) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            authors: authors::AuthorsService::new(Arc::new(repository.authors.clone())),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(Arc::new(repository.instances.clone())),
            redis: redis_service,
            repository,
        }
    }
}
