//! Health check endpoint
//!
//! - `/helthz` - Liveness: answers `200 OK` with body `OK` for any method

use axum::{routing::any, Router};

/// Path of the health route, spelled exactly as deployed probes expect it
pub const HEALTH_PATH: &str = "/helthz";

/// Health check handler
///
/// Ignores method, headers and body.
async fn helthz() -> &'static str {
    "OK"
}

/// Build the router serving the health route
///
/// Unknown paths fall through to axum's default 404.
pub fn build_router() -> Router {
    Router::new().route(HEALTH_PATH, any(helthz))
}
