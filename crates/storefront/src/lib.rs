//! Chirag Jewellers storefront library.
//!
//! JSON API for the catalog, address book, cart, order placement and the
//! admin back office. Exposed as a library so the binary, the CLI and the
//! integration tests share one router and one set of repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::state::AppState;

/// Build the full application router.
///
/// Layers, outermost first: HTTP tracing, request ID, security headers,
/// session. Sentry layers are added by the binary around the stateless
/// router.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                // Path only: catalog search terms stay out of the logs
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    let status = response.status();
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("status", status.as_u16());
                    span.record("latency_ms", latency_ms);

                    if status.is_server_error() {
                        tracing::warn!(parent: span, %status, latency_ms, "Request failed");
                    } else {
                        tracing::debug!(parent: span, %status, latency_ms, "Request finished");
                    }
                }),
        )
        .with_state(state)
}

/// Liveness: the process is up. Touches nothing else.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 until the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness probe could not reach the database");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
