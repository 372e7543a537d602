//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding with the JSON failure envelope. Route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use zip_glass_core::ValidationErrors;

use crate::routes::ApiResponse;

/// Shown to the submitter for any client-side problem with a submission.
pub const INVALID_SUBMISSION_MESSAGE: &str =
    "Invalid quote data. Please check your information and try again.";

/// Shown to the submitter when the server itself fails.
pub const SERVER_FAILURE_MESSAGE: &str =
    "Failed to send quote request. Please try again or call us directly.";

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Body was not JSON, or did not match the expected shape.
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    /// Body parsed but one or more fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A message template failed to render.
    #[error("Template error: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short error kind exposed in server failure envelopes.
    const fn kind(&self) -> Option<&'static str> {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) => None,
            Self::Render(_) => Some("render"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Validation(errors) = &self {
            tracing::warn!(
                failed = errors.len(),
                fields = ?errors.fields().collect::<Vec<_>>(),
                "Rejected submission"
            );
        } else {
            tracing::warn!(error = %self, "Rejected submission");
        }

        // Don't expose internal error details to clients
        let body = if status.is_server_error() {
            ApiResponse {
                success: false,
                message: SERVER_FAILURE_MESSAGE.to_string(),
                error: self.kind().map(String::from),
            }
        } else {
            ApiResponse::failure(INVALID_SUBMISSION_MESSAGE)
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for submission activity.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
