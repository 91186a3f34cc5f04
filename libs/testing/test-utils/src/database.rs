//! Database test infrastructure
//!
//! Provides a `TestDatabase` helper backed by an in-memory SQLite database with
//! the workspace migrator applied, including the seeded categories.

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Test database wrapper
///
/// Each instance owns a private database that disappears when the connection
/// pool is dropped, so tests never share rows.
pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Create a new test database with migrations applied
    ///
    /// # Example
    ///
    /// ```no_run
    /// use test_utils::TestDatabase;
    ///
    /// # async fn example() {
    /// let db = TestDatabase::new().await;
    /// // Use db.connection() to create your repository
    /// # }
    /// ```
    pub async fn new() -> Self {
        // Every SQLite memory connection is a separate database: pin the pool to one
        let mut options = ConnectOptions::new(IN_MEMORY_URL);
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .expect("Failed to open in-memory SQLite database");

        Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        tracing::info!("Test database ready (in-memory SQLite)");

        Self { connection }
    }

    /// Clone of the pooled connection, ready to hand to a repository
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}
