//! Quote request notification sent to the business inbox.
//!
//! Every field is run through `sanitize_input` before it is embedded, and the
//! HTML body is rendered by askama with escaping on.

use askama::Template;
use chrono::{DateTime, TimeZone};
use zip_glass_core::QuoteRequest;
use zip_glass_core::contact::TIMESTAMP_FORMAT;
use zip_glass_core::sanitize_input;

use crate::services::OutgoingEmail;

#[derive(Template)]
#[template(path = "email/quote_request.html")]
struct QuoteHtml<'a> {
    name: &'a str,
    phone: &'a str,
    email: &'a str,
    damage_type: &'a str,
    chip_count: Option<&'a str>,
    description: Option<&'a str>,
    submitted_at: &'a str,
}

#[derive(Template)]
#[template(path = "email/quote_request.txt")]
struct QuoteText<'a> {
    name: &'a str,
    phone: &'a str,
    email: &'a str,
    damage_type: &'a str,
    chip_count: Option<&'a str>,
    description: Option<&'a str>,
    submitted_at: &'a str,
}

/// A composed quote notification, ready to address and send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteNotification {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl QuoteNotification {
    /// Compose the notification for an already validated request.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to render.
    pub fn compose<Tz>(
        request: &QuoteRequest,
        submitted_at: &DateTime<Tz>,
    ) -> Result<Self, askama::Error>
    where
        Tz: TimeZone,
        Tz::Offset: core::fmt::Display,
    {
        let name = sanitize_input(&request.name);
        let phone = sanitize_input(&request.phone);
        let email = sanitize_input(&request.email);
        let damage_type = sanitize_input(&request.damage_type);
        let chip_count = request.chip_count().map(|chips| chips.as_str());
        let description = request.description();
        let submitted_at = submitted_at.format(TIMESTAMP_FORMAT).to_string();

        let html_body = QuoteHtml {
            name: &name,
            phone: &phone,
            email: &email,
            damage_type: &damage_type,
            chip_count,
            description: description.as_deref(),
            submitted_at: &submitted_at,
        }
        .render()?;

        let text_body = QuoteText {
            name: &name,
            phone: &phone,
            email: &email,
            damage_type: &damage_type,
            chip_count,
            description: description.as_deref(),
            submitted_at: &submitted_at,
        }
        .render()?;

        Ok(Self {
            subject: format!("New Quote Request from {name}"),
            html_body,
            text_body,
        })
    }

    /// Address the notification.
    #[must_use]
    pub fn into_email(self, to: &str, from: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            from: from.to_string(),
            subject: self.subject,
            html_body: self.html_body,
            text_body: self.text_body,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn request() -> QuoteRequest {
        QuoteRequest {
            name: "Jane O'Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "402-555-0100".to_string(),
            damage_type: "Small damage (2 chips or cracks smaller than 10 inches)".to_string(),
            chip_count: Some("2".to_string()),
            description: Some("Passenger side, near the <wiper>".to_string()),
        }
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 4, 15, 9, 26).unwrap()
    }

    #[test]
    fn test_subject() {
        let notification = QuoteNotification::compose(&request(), &submitted_at()).unwrap();
        assert_eq!(notification.subject, "New Quote Request from Jane ODoe");
    }

    #[test]
    fn test_html_body_embeds_escaped_fields() {
        let notification = QuoteNotification::compose(&request(), &submitted_at()).unwrap();
        let html = notification.html_body;

        assert!(html.contains("<strong>Name:</strong> Jane ODoe"));
        assert!(html.contains("<strong>Phone:</strong> 402-555-0100"));
        assert!(html.contains("<strong>Email:</strong> jane@example.com"));
        assert!(html.contains(
            "<strong>Type:</strong> Small damage (2 chips or cracks smaller than 10 inches)"
        ));
        assert!(html.contains("<strong>Number of chips/cracks:</strong> 2"));
        assert!(html.contains("<p>Passenger side, near the wiper</p>"));
        assert!(html.contains("<strong>Submitted:</strong> 7"));
        assert!(html.contains("2026, 3:09:26 PM"));
    }

    #[test]
    fn test_text_body() {
        let notification = QuoteNotification::compose(&request(), &submitted_at()).unwrap();
        let text = notification.text_body;

        assert!(text.starts_with("New Quote Request - Zip Glass\n"));
        assert!(text.contains("Name: Jane ODoe\n"));
        assert!(text.contains("Phone: 402-555-0100\n"));
        assert!(text.contains("Email: jane@example.com\n"));
        assert!(text.contains(
            "Damage Details:\nSmall damage (2 chips or cracks smaller than 10 inches)\n"
        ));
        assert!(text.contains("Number of chips/cracks: 2\n"));
        assert!(text.contains("Additional Information:\nPassenger side, near the wiper\n"));
        assert!(text.ends_with("Submitted on: 7/4/2026, 3:09:26 PM"));
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let mut request = request();
        request.chip_count = None;
        request.description = None;

        let notification = QuoteNotification::compose(&request, &submitted_at()).unwrap();

        assert!(!notification.html_body.contains("Number of chips/cracks"));
        assert!(!notification.html_body.contains("Additional Information"));
        assert!(!notification.text_body.contains("Number of chips/cracks"));
        assert!(!notification.text_body.contains("Additional Information"));
    }

    #[test]
    fn test_free_text_is_sanitized() {
        let mut request = request();
        request.damage_type = "<img src=x onerror=alert(1)>".to_string();

        let notification = QuoteNotification::compose(&request, &submitted_at()).unwrap();

        assert!(!notification.html_body.contains("<img"));
        assert!(notification.text_body.contains("img src=x onerror=alert(1)"));
    }

    #[test]
    fn test_contact_fields_are_sanitized() {
        let mut request = request();
        request.email = "a'b\"c&<x>@ex.com".to_string();
        assert!(request.validate().is_ok());

        let notification = QuoteNotification::compose(&request, &submitted_at()).unwrap();

        assert!(notification.text_body.contains("Email: abcx@ex.com\n"));
        assert!(notification.html_body.contains("<strong>Email:</strong> abcx@ex.com"));
        assert!(!notification.subject.contains('\''));
    }

    #[test]
    fn test_into_email() {
        let email = QuoteNotification::compose(&request(), &submitted_at())
            .unwrap()
            .into_email("owner@zip.glass", "site@zip.glass");

        assert_eq!(email.to, "owner@zip.glass");
        assert_eq!(email.from, "site@zip.glass");
        assert_eq!(email.subject, "New Quote Request from Jane ODoe");
    }
}
