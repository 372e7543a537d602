//! End-to-end tests for the Zip Glass quote submission API.
//!
//! Each test boots the real router on an ephemeral port and talks to it over
//! HTTP, with a mail backend chosen by the test.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p zip-glass-integration-tests
//! ```
//!
//! No relay or network access is needed: the recording mailer keeps messages
//! in memory, and SMTP failure cases point at a closed local port.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use zip_glass_site::config::NotificationConfig;
use zip_glass_site::services::{Delivery, Mailer, OutgoingEmail};
use zip_glass_site::state::AppState;

/// Address notifications are sent to in tests.
pub const TEST_RECIPIENT: &str = "owner@zip.glass";

/// Address notifications are sent from in tests.
pub const TEST_SENDER: &str = "site@zip.glass";

/// A site instance listening on a local ephemeral port.
pub struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
}

impl TestServer {
    /// Boot the site with the given mailer.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port could be bound.
    pub async fn start(mailer: Arc<dyn Mailer>) -> std::io::Result<Self> {
        Self::start_with_timeout(mailer, Duration::from_secs(2)).await
    }

    /// Boot the site with the given mailer and delivery timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port could be bound.
    pub async fn start_with_timeout(
        mailer: Arc<dyn Mailer>,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        let notifications = NotificationConfig {
            recipient: TEST_RECIPIENT.to_string(),
            sender: TEST_SENDER.to_string(),
            timeout,
        };
        let app = zip_glass_site::app(AppState::new(notifications, mailer));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
        })
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// HTTP client for talking to this server.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Mailer that keeps every message in memory.
///
/// Answers with `Delivery::Failed` when built with [`RecordingMailer::failing`].
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<String>,
}

impl RecordingMailer {
    /// A recorder whose deliveries all succeed.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A recorder whose deliveries all fail with `reason`.
    #[must_use]
    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::default(),
            fail_with: Some(reason.to_string()),
        })
    }

    /// Messages handed to this mailer so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email.clone());
        self.fail_with
            .as_deref()
            .map_or(Delivery::Delivered, Delivery::failed)
    }
}

/// Mailer that never finishes, for exercising the delivery timeout.
#[derive(Debug, Default)]
pub struct StalledMailer;

#[async_trait]
impl Mailer for StalledMailer {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn send(&self, _email: &OutgoingEmail) -> Delivery {
        std::future::pending().await
    }
}
