//! Local library catalog server
//!
//! REST JSON API for browsing a small library catalog (books, authors,
//! genres and physical copies) and for librarians to renew and return loans.

use std::sync::Arc;

pub mod api;
pub mod authz;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
