//! Outbound email abstraction.
//!
//! Handlers talk to a [`Mailer`] and get back a [`Delivery`]. Ordinary
//! failures (network, auth, rejected recipient) are values, not errors, so a
//! caller can record them without changing its own outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::services::smtp::SmtpMailer;

/// A fully composed message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the transport.
    Delivered,
    /// Not delivered, with a reason suitable for logs.
    Failed(String),
}

impl Delivery {
    pub fn failed(reason: impl ToString) -> Self {
        Self::Failed(reason.to_string())
    }
}

/// Something that can deliver an [`OutgoingEmail`].
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Attempt delivery once. Never retries.
    async fn send(&self, email: &OutgoingEmail) -> Delivery;
}

/// Errors building a mail backend at startup.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Mailer that only writes the message to the log.
///
/// Used when no SMTP relay is configured, so the site keeps accepting quotes
/// and the details stay recoverable from the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        tracing::info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Email not sent: no SMTP relay configured"
        );
        tracing::debug!(body = %email.text_body, "Unsent email body");
        Delivery::Delivered
    }
}

/// Build the mailer selected by configuration.
///
/// # Errors
///
/// Returns an error if the SMTP relay settings cannot produce a transport.
pub fn from_config(config: &SiteConfig) -> Result<Arc<dyn Mailer>, MailerError> {
    match &config.smtp {
        Some(smtp) => Ok(Arc::new(SmtpMailer::new(
            smtp,
            config.notifications.timeout,
        )?)),
        None => {
            tracing::warn!("SMTP_HOST not set, quote notifications will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Send through `mailer`, giving up after `timeout`.
///
/// A timeout is reported as [`Delivery::Failed`].
pub async fn send_with_timeout(
    mailer: &dyn Mailer,
    email: &OutgoingEmail,
    timeout: Duration,
) -> Delivery {
    match tokio::time::timeout(timeout, mailer.send(email)).await {
        Ok(delivery) => delivery,
        Err(_) => Delivery::Failed(format!(
            "{} mailer timed out after {}s",
            mailer.name(),
            timeout.as_secs_f32()
        )),
    }
}
