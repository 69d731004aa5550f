//! Business logic services

pub mod catalog;
pub mod instances;
pub mod loans;
pub mod queries;
pub mod visits;

use std::sync::Arc;

use crate::{authz::Authorizer, config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub instances: instances::InstancesService,
    pub loans: loans::LoansService,
    pub queries: queries::CatalogQueryService,
    pub visits: visits::VisitCounter,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, authz: Arc<dyn Authorizer>, config: &AppConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(
                repository.clone(),
                authz.clone(),
                config.catalog.clone(),
            ),
            instances: instances::InstancesService::new(repository.clone(), authz.clone()),
            loans: loans::LoansService::new(repository.clone(), authz.clone(), &config.loans),
            queries: queries::CatalogQueryService::new(repository, authz, config.catalog.clone()),
            visits: visits::VisitCounter::new(),
        }
    }
}
