//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::openapi;
use crate::server;
use crate::state::AppState;

/// Routes mounted under `/api`
pub fn routes(state: &AppState) -> Router {
    products::router(state)
}

/// Complete application: `/api`, docs, fallback, layers and health probes
pub fn app(state: &AppState) -> eyre::Result<Router> {
    let router = server::build_router(
        routes(state),
        openapi::api_doc(),
        &state.config.cors_allowed_origins,
    )?;

    Ok(router.merge(health::router(state.clone())))
}
