//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # API
//! POST /api/send-quote         - Submit a quote request (JSON)
//! ```
//!
//! Pages, navigation and form UI are served separately; this router only
//! carries the submission API.

pub mod quote;

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Envelope returned by every API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }
}

/// Largest accepted submission body. Free text is cut to 1000 characters
/// anyway, so anything near this size is not a real quote.
pub const MAX_SUBMISSION_BYTES: usize = 64 * 1024;

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/send-quote", post(quote::send_quote))
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}
