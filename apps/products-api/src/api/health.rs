//! Liveness and readiness endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::pin::Pin;

use crate::config::AppInfo;
use crate::db;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// A boxed health check resolving to an error message on failure
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Run checks concurrently.
///
/// Responds `200 {status: "ready", <name>: "connected", ..}` when every check
/// passes, otherwise `503` with `status: "not ready"` and the failing checks
/// marked `"disconnected"`.
pub async fn run_health_checks(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> Response {
    let (names, futures): (Vec<_>, Vec<_>) = checks.into_iter().unzip();
    let results = join_all(futures).await;

    let mut body = Map::new();
    let mut all_healthy = true;

    for (name, result) in names.into_iter().zip(results) {
        let status = match result {
            Ok(()) => "connected",
            Err(e) => {
                tracing::error!(check = name, error = %e, "Readiness check failed");
                all_healthy = false;
                "disconnected"
            }
        };
        body.insert(name.to_string(), json!(status));
    }

    let (code, status) = if all_healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    };
    body.insert("status".to_string(), json!(status));

    (code, Json(Value::Object(body))).into_response()
}

async fn health_handler(State(app): State<AppInfo>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    })
}

async fn ready_handler(State(state): State<AppState>) -> Response {
    match &state.db {
        Some(conn) => {
            let database: HealthCheckFuture<'_> =
                Box::pin(async move { db::check_health(conn).await.map_err(|e| e.to_string()) });
            run_health_checks(vec![("database", database)]).await
        }
        None => Json(json!({ "status": "ready", "database": "in-memory" })).into_response(),
    }
}

/// `/health` and `/ready`, mounted at the root
pub fn router(state: AppState) -> Router {
    let health = Router::new()
        .route("/health", get(health_handler))
        .with_state(state.config.app);

    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
        .merge(health)
}
