//! Input sanitization and validation rules.
//!
//! These are shared by the form pages (before a payload is built) and by the
//! quote endpoint (before a notification is composed). Every function is pure
//! and infallible: invalid input yields `false` or a cleaned, possibly empty,
//! string.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

/// Maximum number of characters kept by [`sanitize_input`].
pub const MAX_INPUT_LENGTH: usize = 1000;

/// Maximum length of an email address (RFC 5321).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum length of a customer name.
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximum length of a customer name.
pub const NAME_MAX_LENGTH: usize = 100;

/// Minimum length of a phone number once whitespace is removed.
pub const PHONE_MIN_LENGTH: usize = 10;

/// Maximum length of a phone number once whitespace is removed.
pub const PHONE_MAX_LENGTH: usize = 15;

/// Characters that could open markup or break out of an attribute.
const FORBIDDEN_CHARS: [char; 5] = ['<', '>', '\'', '"', '&'];

/// URI schemes stripped from free text. Must be lowercase.
const FORBIDDEN_SCHEMES: [&str; 2] = ["javascript:", "data:"];

/// Clean free text before it is embedded in a message or submitted.
///
/// Removes `< > ' " &`, removes every case-insensitive `javascript:` and
/// `data:` occurrence, trims surrounding whitespace and keeps at most
/// [`MAX_INPUT_LENGTH`] characters.
///
/// Removal never splices a scheme back together, so input like
/// `javajavascript:script:` is cleaned completely. The result is a fixed
/// point: `sanitize_input(&sanitize_input(s)) == sanitize_input(s)`. Runs in
/// time linear in the input length.
///
/// # Examples
///
/// ```
/// use zip_glass_core::sanitize_input;
///
/// assert_eq!(sanitize_input("  <b>Hi</b> & bye "), "bHi/b  bye");
/// assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
/// ```
#[must_use]
pub fn sanitize_input(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());

    // The buffer never contains a scheme, so a new one can only end at the
    // character just pushed.
    for c in input.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)) {
        cleaned.push(c);
        if let Some(len) = trailing_scheme_len(&cleaned) {
            cleaned.truncate(cleaned.len() - len);
        }
    }

    // Truncation can expose trailing whitespace, so trim again afterwards.
    truncate_chars(cleaned.trim(), MAX_INPUT_LENGTH)
        .trim_end()
        .to_owned()
}

/// Check that an email address has a `local@domain.tld` shape.
///
/// Neither side of the `@` may contain whitespace or another `@`, the domain
/// needs a `.` with at least one character on each side, and the whole
/// address must be at most [`MAX_EMAIL_LENGTH`] characters.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.chars().any(is_blank) {
        return false;
    }

    if domain.contains('@') || domain.chars().any(is_blank) {
        return false;
    }

    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}

/// Check that a phone number is plausible.
///
/// Whitespace is ignored. What remains must be 10 to 15 characters made only
/// of ASCII digits and `- ( ) + .`.
#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    let compact: Vec<char> = phone.chars().filter(|c| !is_blank(*c)).collect();

    (PHONE_MIN_LENGTH..=PHONE_MAX_LENGTH).contains(&compact.len())
        && compact
            .iter()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '(' | ')' | '+' | '.'))
}

/// Check that a customer name is 2 to 100 characters of ASCII letters,
/// whitespace, hyphens, apostrophes and periods.
#[must_use]
pub fn validate_name(name: &str) -> bool {
    let length = name.chars().count();

    (NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&length)
        && name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || is_blank(c) || matches!(c, '-' | '\'' | '.'))
}

/// Build a `mailto:` URI with a sanitized, percent-encoded subject and body.
///
/// `to` is expected to be a trusted constant and is inserted as-is.
///
/// # Examples
///
/// ```
/// use zip_glass_core::create_secure_mailto_link;
///
/// let link = create_secure_mailto_link("info@zip.glass", "Hi <there>", "a & b");
/// assert_eq!(link, "mailto:info@zip.glass?subject=Hi%20there&body=a%20%20b");
/// ```
#[must_use]
pub fn create_secure_mailto_link(to: &str, subject: &str, body: &str) -> String {
    let subject = sanitize_input(subject);
    let body = sanitize_input(body);

    format!(
        "mailto:{to}?subject={}&body={}",
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

/// Whitespace as understood by browser-side form validation (`\s`).
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Byte length of the forbidden scheme `text` ends with, ignoring ASCII case.
fn trailing_scheme_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();

    FORBIDDEN_SCHEMES
        .iter()
        .find(|scheme| {
            bytes
                .len()
                .checked_sub(scheme.len())
                .and_then(|start| bytes.get(start..))
                .is_some_and(|tail| tail.eq_ignore_ascii_case(scheme.as_bytes()))
        })
        .map(|scheme| scheme.len())
}

/// Keep at most `max` characters of `s`.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}
