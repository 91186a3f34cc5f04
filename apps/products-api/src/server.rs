//! Router assembly and the HTTP server lifecycle.

use axum::{
    extract::OriginalUri,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use eyre::WrapErr;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;

/// JSON 404 for routes that do not exist.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Cannot {} {}", method, uri.path()) })),
    )
}

fn cors_layer(origins: &[String]) -> eyre::Result<CorsLayer> {
    let allowed = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    info!(origins = ?origins, "CORS enabled");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600)))
}

/// Wrap the API routes with docs, fallback and the tower-http layers.
///
/// `apis` is nested under `/api`; Swagger UI is served at `/swagger-ui` with
/// the document at `/api-docs/openapi.json`. A CORS layer is only added when
/// `cors_origins` is non-empty.
pub fn build_router(
    apis: Router,
    openapi: utoipa::openapi::OpenApi,
    cors_origins: &[String],
) -> eyre::Result<Router> {
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    if !cors_origins.is_empty() {
        router = router.layer(cors_layer(cors_origins)?);
    }

    Ok(router.layer(CompressionLayer::new()))
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}

/// Serve `router` until a shutdown signal, then run `cleanup`.
///
/// In-flight requests drain before `cleanup` starts; `cleanup` is abandoned
/// once `shutdown_timeout` elapses.
pub async fn serve<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server listening on {}", listener.local_addr()?);

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| error!(error = %e, "Server encountered an error"));

    info!("Running cleanup (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed"),
        Err(_) => warn!("Cleanup exceeded {:?}, forcing shutdown", shutdown_timeout),
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn api() -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }

    fn openapi() -> utoipa::openapi::OpenApi {
        utoipa::openapi::OpenApiBuilder::new().build()
    }

    #[tokio::test]
    async fn test_api_is_nested() {
        let app = build_router(api(), openapi(), &[]).unwrap();
        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"pong");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_json_404() {
        let app = build_router(api(), openapi(), &[]).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/nowhere?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": "Cannot POST /nowhere" }));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = build_router(api(), openapi(), &[]).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let origins = vec!["http://localhost:4200".to_string()];
        let app = build_router(api(), openapi(), &origins).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/ping")
                    .header(header::ORIGIN, "http://localhost:4200")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:4200"))
        );
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(build_router(api(), openapi(), &origins).is_err());
    }
}
