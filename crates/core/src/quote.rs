//! Quote request payload and the quote page's form state.
//!
//! [`QuoteRequest`] is the JSON body posted to `/api/send-quote`. The page
//! fills a [`QuoteForm`], validates it, and turns it into a request with
//! [`QuoteForm::to_request`]. The endpoint re-runs [`QuoteRequest::validate`]
//! on whatever arrives.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::security::{sanitize_input, validate_email, validate_name, validate_phone};
use crate::validation::{Field, FieldError, ValidationErrors};

/// Size category picked on the quote page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageSize {
    /// Larger than 10 inches; needs replacement rather than repair.
    Large,
    /// Up to three chips or cracks smaller than 10 inches.
    Small,
}

/// Number of chips or cracks for small damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChipCount {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl ChipCount {
    /// Wire value ("1", "2" or "3").
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
        }
    }
}

impl fmt::Display for ChipCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a chip count is not "1", "2" or "3".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("chip count must be 1, 2 or 3 (got {0:?})")]
pub struct ChipCountError(String);

impl FromStr for ChipCount {
    type Err = ChipCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            "3" => Ok(Self::Three),
            other => Err(ChipCountError(other.to_owned())),
        }
    }
}

/// Damage as described to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Damage {
    Large,
    Small(ChipCount),
}

impl Damage {
    /// Human-readable description sent as `damageType`.
    ///
    /// ```
    /// use zip_glass_core::{ChipCount, Damage};
    ///
    /// assert_eq!(
    ///     Damage::Small(ChipCount::One).describe(),
    ///     "Small damage (1 chip or crack smaller than 10 inches)"
    /// );
    /// ```
    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Large => "Large damage (larger than 10 inches)".to_owned(),
            Self::Small(chips) => {
                let plural = if chips == ChipCount::One { "" } else { "s" };
                format!("Small damage ({chips} chip{plural} or crack{plural} smaller than 10 inches)")
            }
        }
    }
}

/// Body of `POST /api/send-quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub damage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl QuoteRequest {
    /// Check name, phone and email, plus the chip count when one is given.
    ///
    /// `damage_type` is free text and always accepted.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = validate_contact_fields(&self.name, &self.phone, &self.email);

        if let Some(raw) = self.chip_count.as_deref().filter(|s| !s.is_empty())
            && raw.parse::<ChipCount>().is_err()
        {
            errors.push(Field::ChipCount, FieldError::INVALID_CHIP_COUNT);
        }

        errors.into_result()
    }

    /// Parsed chip count, if present and well-formed.
    #[must_use]
    pub fn chip_count(&self) -> Option<ChipCount> {
        self.chip_count.as_deref()?.parse().ok()
    }

    /// Sanitized description, `None` when absent or empty after cleaning.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(sanitize_input)
            .filter(|text| !text.is_empty())
    }
}

/// State of the quote page form, owned by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteForm {
    pub damage_size: Option<DamageSize>,
    pub chip_count: Option<ChipCount>,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub description: String,
}

impl QuoteForm {
    /// Damage selection, once enough has been picked to describe it.
    #[must_use]
    pub const fn damage(&self) -> Option<Damage> {
        match (self.damage_size, self.chip_count) {
            (Some(DamageSize::Large), _) => Some(Damage::Large),
            (Some(DamageSize::Small), Some(chips)) => Some(Damage::Small(chips)),
            _ => None,
        }
    }

    /// Whether the submit button should be enabled.
    ///
    /// Large damage is routed to a replacement notice instead of a quote, so
    /// only small damage with a chip count can be submitted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self.damage(), Some(Damage::Small(_)))
            && !self.name.is_empty()
            && !self.phone.is_empty()
            && !self.email.is_empty()
    }

    /// Inline errors to show next to the form fields.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = validate_contact_fields(&self.name, &self.phone, &self.email);
        if self.damage().is_none() {
            errors.push(Field::DamageType, FieldError::MISSING_DAMAGE);
        }
        errors.into_result()
    }

    /// Build the payload posted to the quote endpoint.
    #[must_use]
    pub fn to_request(&self) -> QuoteRequest {
        let description = sanitize_input(&self.description);

        QuoteRequest {
            name: sanitize_input(&self.name),
            email: sanitize_input(&self.email),
            phone: sanitize_input(&self.phone),
            damage_type: self.damage().map(Damage::describe).unwrap_or_default(),
            chip_count: self.chip_count.map(|chips| chips.as_str().to_owned()),
            description: (!description.is_empty()).then_some(description),
        }
    }
}

/// Shared name/phone/email checks, in the order the page shows them.
pub(crate) fn validate_contact_fields(name: &str, phone: &str, email: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if !validate_name(name) {
        errors.push(Field::Name, FieldError::INVALID_NAME);
    }
    if !validate_phone(phone) {
        errors.push(Field::Phone, FieldError::INVALID_PHONE);
    }
    if !validate_email(email) {
        errors.push(Field::Email, FieldError::INVALID_EMAIL);
    }

    errors
}
