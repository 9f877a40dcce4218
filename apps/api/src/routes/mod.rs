pub mod health;

use std::any::Any;

use anyhow::anyhow;
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::AppError;
use crate::simplify::handlers;
use crate::state::AppState;

async fn method_not_allowed() -> Result<(), AppError> {
    Err(AppError::MethodNotAllowed)
}

/// Turns a handler panic into the generic 500 body. The payload is logged only.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "non-string panic payload".to_string()
    };
    AppError::Internal(anyhow!("Handler panicked: {detail}")).into_response()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/simplify",
            post(handlers::handle_simplify).fallback(method_not_allowed),
        )
        .route(
            "/api/stats",
            post(handlers::handle_stats).fallback(method_not_allowed),
        )
        .route("/api/levels/:level", get(handlers::handle_level_preview))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
