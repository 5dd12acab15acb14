//! BookNet Book Sharing Network
//!
//! A Rust implementation of the BookNet server, providing a REST JSON API
//! for publishing books, borrowing them from other members, and handling
//! the return/approval workflow.

use std::sync::Arc;

pub mod api;
pub mod config;
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
