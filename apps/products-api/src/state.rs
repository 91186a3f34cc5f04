//! Application state management

use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when the catalog runs on the in-memory store
    pub db: Option<DatabaseConnection>,
}
