//! Bookshelf Catalog Server
//!
//! A small catalog manager for books and their authors, exposing
//! create/list/edit/delete/detail operations gated by authentication and
//! group-based permissions.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
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
