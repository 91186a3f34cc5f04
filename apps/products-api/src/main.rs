//! Products API - product catalog REST server

use eyre::WrapErr;
use migration::{Migrator, MigratorTrait};
use tracing::{info, warn};

mod api;
mod config;
mod db;
mod openapi;
mod server;
mod state;
mod telemetry;

use config::{Config, FromEnv};
use state::AppState;
use telemetry::{init_tracing, install_color_eyre};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment);

    let db = match &config.database {
        Some(database) => {
            info!("Connecting to PostgreSQL");
            let db = db::connect_with_retry(database)
                .await
                .wrap_err("Failed to connect to database")?;

            if config.run_migrations {
                Migrator::up(&db, None)
                    .await
                    .wrap_err("Failed to run database migrations")?;
                info!("Database migrations applied");
            }
            Some(db)
        }
        None => {
            warn!("CATALOG_STORE=memory: catalog data lives in process memory only");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        db,
    };

    let app = api::app(&state)?;

    info!(
        store = ?config.store,
        "Starting Products API on port {}",
        config.server.port
    );

    let pool = state.db.clone();
    server::serve(app, &config.server, config.shutdown_timeout, async move {
        if let Some(pool) = pool {
            info!("Closing database connections");
            if let Err(e) = pool.close().await {
                warn!(error = %e, "Failed to close database pool cleanly");
            }
        }
    })
    .await
    .wrap_err("Server error")?;

    info!("Products API shutdown complete");
    Ok(())
}
