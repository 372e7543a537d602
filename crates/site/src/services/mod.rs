//! Business logic services for the site.
//!
//! # Services
//!
//! - `mailer` - Outbound email abstraction and the log-only backend
//! - `smtp` - SMTP relay backend (lettre)

pub mod mailer;
pub mod smtp;

pub use mailer::{Delivery, LogMailer, Mailer, MailerError, OutgoingEmail};
pub use smtp::SmtpMailer;
