//! Quote request submission.
//!
//! Re-validates the payload, emails the business, and acknowledges the
//! submitter. Delivery is best-effort: once a payload is valid the response is
//! always a success, and a failed delivery is only logged.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Local;
use tracing::instrument;
use zip_glass_core::QuoteRequest;

use crate::error::{Result, add_breadcrumb};
use crate::notification::QuoteNotification;
use crate::routes::ApiResponse;
use crate::services::Delivery;
use crate::services::mailer::send_with_timeout;
use crate::state::AppState;

/// Shown to the submitter once a quote request has been accepted.
pub const QUOTE_ACCEPTED_MESSAGE: &str = "Quote request sent successfully!";

/// Submit a quote request.
///
/// POST /api/send-quote
///
/// Answers 400 for malformed or invalid payloads without attempting delivery.
/// Otherwise answers 200 whatever the mailer reports.
#[instrument(skip_all)]
pub async fn send_quote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::info!(
        name = %request.name,
        email = %request.email,
        phone = %request.phone,
        damage_type = %request.damage_type,
        "Quote request received"
    );
    add_breadcrumb(
        "quote",
        "Quote request received",
        &[("damage_type", request.damage_type.as_str())],
    );

    let notifications = state.notifications();
    let email = QuoteNotification::compose(&request, &Local::now())?
        .into_email(&notifications.recipient, &notifications.sender);

    let mailer = state.mailer();
    match send_with_timeout(mailer, &email, notifications.timeout).await {
        Delivery::Delivered => {
            tracing::info!(mailer = mailer.name(), to = %email.to, "Quote notification sent");
        }
        Delivery::Failed(reason) => {
            tracing::warn!(
                mailer = mailer.name(),
                to = %email.to,
                reason = %reason,
                "Quote notification not delivered"
            );
        }
    }

    Ok(Json(ApiResponse::ok(QUOTE_ACCEPTED_MESSAGE)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::NotificationConfig;
    use crate::error::INVALID_SUBMISSION_MESSAGE;
    use crate::services::{Mailer, OutgoingEmail};

    /// Records every message and answers with a fixed outcome.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_with: Option<&'static str>,
    }

    impl RecordingMailer {
        fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, email: &OutgoingEmail) -> Delivery {
            self.sent.lock().unwrap().push(email.clone());
            self.fail_with.map_or(Delivery::Delivered, Delivery::failed)
        }
    }

    fn app(mailer: Arc<RecordingMailer>) -> Router {
        let notifications = NotificationConfig {
            recipient: "owner@zip.glass".to_string(),
            sender: "site@zip.glass".to_string(),
            timeout: Duration::from_secs(1),
        };
        crate::routes::routes().with_state(AppState::new(notifications, mailer))
    }

    fn jane() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "402-555-0100",
            "damageType": "Small damage (1 chip or crack smaller than 10 inches)",
            "chipCount": "1"
        })
    }

    async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
        let request = Request::post("/api/send-quote")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_quote_is_sent_and_acknowledged() {
        let mailer = Arc::new(RecordingMailer::default());

        let (status, body) = post_json(app(mailer.clone()), jane().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], QUOTE_ACCEPTED_MESSAGE);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        let email = sent.first().unwrap();
        assert_eq!(email.to, "owner@zip.glass");
        assert_eq!(email.from, "site@zip.glass");
        assert_eq!(email.subject, "New Quote Request from Jane Doe");
        assert!(email.text_body.contains("Phone: 402-555-0100"));
        assert!(email.html_body.contains("Number of chips/cracks"));
    }

    #[tokio::test]
    async fn test_failed_delivery_still_succeeds() {
        let mailer = Arc::new(RecordingMailer {
            fail_with: Some("554 Message rejected: Email address is not verified"),
            ..RecordingMailer::default()
        });

        let (status, body) = post_json(app(mailer.clone()), jane().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected_without_sending() {
        let mailer = Arc::new(RecordingMailer::default());
        let payload = json!({"name": "J", "email": "bad", "phone": "1", "damageType": ""});

        let (status, body) = post_json(app(mailer.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], INVALID_SUBMISSION_MESSAGE);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut payload = jane();
        payload.as_object_mut().unwrap().remove("damageType");

        let (status, body) = post_json(app(mailer.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut payload = jane();
        payload["phone"] = json!(4_025_550_100_u64);

        let (status, body) = post_json(app(mailer), payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());

        let (status, body) = post_json(app(mailer), "{\"name\": ".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let request = Request::post("/api/send-quote")
            .body(Body::from(jane().to_string()))
            .unwrap();

        let response = app(mailer).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_chip_count_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut payload = jane();
        payload["chipCount"] = json!("9");

        let (status, _) = post_json(app(mailer.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_nested_schemes_in_description_are_cleaned() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut payload = jane();
        payload["description"] = json!(format!(
            "{}{}near the mirror",
            "java".repeat(4000),
            "script:".repeat(4000)
        ));

        let (status, _) = post_json(app(mailer.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let sent = mailer.sent();
        let email = sent.first().unwrap();
        assert!(email.text_body.contains("\nnear the mirror\n"));
        assert!(!email.text_body.contains("javascript:"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_without_sending() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut payload = jane();
        payload["description"] = json!("java".repeat(crate::routes::MAX_SUBMISSION_BYTES / 4));

        let (status, body) = post_json(app(mailer.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], INVALID_SUBMISSION_MESSAGE);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_resubmission_is_not_deduplicated() {
        let mailer = Arc::new(RecordingMailer::default());
        let router = app(mailer.clone());

        let (first, _) = post_json(router.clone(), jane().to_string()).await;
        let (second, _) = post_json(router, jane().to_string()).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(mailer.sent().len(), 2);
    }
}
