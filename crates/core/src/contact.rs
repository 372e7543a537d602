//! Contact page message, delivered through the visitor's own mail client.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::quote::validate_contact_fields;
use crate::security::{create_secure_mailto_link, sanitize_input};
use crate::validation::ValidationErrors;

/// Subject line of contact page messages.
pub const CONTACT_SUBJECT: &str = "New Contact Message - Zip Glass";

/// Format used for submission timestamps in message bodies.
pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Fields of the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactMessage {
    /// Check name, phone and email. The message itself is optional.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_contact_fields(&self.name, &self.phone, &self.email).into_result()
    }

    /// Plain-text body listing the sanitized fields.
    #[must_use]
    pub fn body<Tz>(&self, submitted_at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: core::fmt::Display,
    {
        format!(
            "New Contact Message from Zip Glass Website\n\
             \n\
             Customer Information:\n\
             Name: {}\n\
             Phone: {}\n\
             Email: {}\n\
             \n\
             Message:\n\
             {}\n\
             \n\
             Submitted on: {}",
            sanitize_input(&self.name),
            sanitize_input(&self.phone),
            sanitize_input(&self.email),
            sanitize_input(&self.message),
            submitted_at.format(TIMESTAMP_FORMAT),
        )
    }

    /// `mailto:` link that opens the visitor's mail client addressed to `to`.
    #[must_use]
    pub fn mailto_link<Tz>(&self, to: &str, submitted_at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: core::fmt::Display,
    {
        create_secure_mailto_link(to, CONTACT_SUBJECT, &self.body(submitted_at))
    }
}
