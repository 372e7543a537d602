//! SMTP mail backend.
//!
//! Works with any SMTP relay, including the SES SMTP interface
//! (`email-smtp.<region>.amazonaws.com`).

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, SmtpTls};
use crate::services::mailer::{Delivery, Mailer, MailerError, OutgoingEmail};

/// Pooled async SMTP transport.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a mailer for the configured relay.
    ///
    /// No connection is opened until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the relay hostname cannot be used for TLS.
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self, MailerError> {
        let builder = match config.tls {
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let mut builder = builder.port(config.port).timeout(Some(timeout));
        if let Some((username, password)) = config.credentials() {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        let message = match build_message(email) {
            Ok(message) => message,
            Err(reason) => return Delivery::Failed(reason),
        };

        match self.transport.send(message).await {
            Ok(response) => {
                tracing::debug!(code = %response.code(), "SMTP relay accepted message");
                Delivery::Delivered
            }
            Err(e) => Delivery::failed(e),
        }
    }
}

/// Build a `multipart/alternative` message with text and HTML parts.
fn build_message(email: &OutgoingEmail) -> Result<Message, String> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| format!("invalid sender {:?}: {e}", email.from))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| format!("invalid recipient {:?}: {e}", email.to))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|e| format!("failed to build message: {e}"))
}
