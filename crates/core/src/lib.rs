//! Zip Glass Core - Shared form validation library.
//!
//! This crate holds the rules that both the site pages and the quote endpoint
//! apply to visitor input:
//!
//! - [`security`] - Sanitization and field validators
//! - [`validation`] - Field-level error types
//! - [`quote`] - Quote request payload and quote page form state
//! - [`contact`] - Contact page message and its `mailto:` link
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP, no
//! mail transport. This keeps the same rules usable on either side of the wire.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod contact;
pub mod quote;
pub mod security;
pub mod validation;

pub use contact::ContactMessage;
pub use quote::{ChipCount, ChipCountError, Damage, DamageSize, QuoteForm, QuoteRequest};
pub use security::{
    create_secure_mailto_link, sanitize_input, validate_email, validate_name, validate_phone,
};
pub use validation::{Field, FieldError, ValidationErrors};
