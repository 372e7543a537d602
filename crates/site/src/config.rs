//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. Without `SMTP_HOST` the site runs with a
//! log-only mailer, which records quote notifications instead of sending them.
//!
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 5000)
//! - `QUOTE_RECIPIENT` - Address that receives quote notifications (default: info@zip.glass)
//! - `QUOTE_SENDER` - From address of quote notifications (default: info@zip.glass)
//! - `MAIL_TIMEOUT_SECS` - Upper bound on one delivery attempt (default: 10)
//! - `SMTP_HOST` - SMTP relay hostname (e.g. email-smtp.us-east-1.amazonaws.com)
//! - `SMTP_PORT` - SMTP relay port (default: 587)
//! - `SMTP_USERNAME` - SMTP username
//! - `SMTP_PASSWORD` - SMTP password (required when `SMTP_USERNAME` is set)
//! - `SMTP_TLS` - `starttls` (default), `tls`, or `none`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `text` (default) or `json`

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_NOTIFICATION_ADDRESS: &str = "info@zip.glass";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Where quote notifications are sent and who they come from
    pub notifications: NotificationConfig,
    /// SMTP relay, `None` for the log-only mailer
    pub smtp: Option<SmtpConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Emit JSON log lines instead of human-readable text
    pub json_logs: bool,
}

/// Fixed addresses and limits for quote notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Business inbox receiving quote requests
    pub recipient: String,
    /// From address on notifications
    pub sender: String,
    /// Upper bound on one delivery attempt
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_NOTIFICATION_ADDRESS.to_string(),
            sender: DEFAULT_NOTIFICATION_ADDRESS.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (port 587)
    StartTls,
    /// TLS from the first byte (port 465)
    Tls,
    /// No encryption; local relays and test servers only
    None,
}

impl std::str::FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" => Ok(Self::Tls),
            "none" => Ok(Self::None),
            other => Err(format!("expected starttls, tls or none (got {other:?})")),
        }
    }
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// SMTP password looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("SITE_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("SITE_PORT", "5000")?;
        let notifications = NotificationConfig::from_env()?;
        let smtp = SmtpConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let json_logs = match get_env_or_default("LOG_FORMAT", "text").as_str() {
            "text" => false,
            "json" => true,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected text or json (got {other:?})"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            notifications,
            smtp,
            sentry_dsn,
            sentry_environment,
            json_logs,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parse_env_or_default("MAIL_TIMEOUT_SECS", "10")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MAIL_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            recipient: get_env_or_default("QUOTE_RECIPIENT", DEFAULT_NOTIFICATION_ADDRESS),
            sender: get_env_or_default("QUOTE_SENDER", DEFAULT_NOTIFICATION_ADDRESS),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        let port = parse_env_or_default("SMTP_PORT", "587")?;
        let tls = parse_env_or_default("SMTP_TLS", "starttls")?;
        let username = get_optional_env("SMTP_USERNAME");
        let password = match &username {
            Some(_) => Some(get_validated_secret("SMTP_PASSWORD")?),
            None => None,
        };

        Ok(Some(Self {
            host,
            port,
            tls,
            username,
            password,
        }))
    }

    /// Username and password pair, when both are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref()?;
        let password = self.password.as_ref()?;
        Some((username, password.expose_secret()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret is not a placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-smtp-password", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        assert!(validate_secret_strength("ChangeMe123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("BFk2Jq8nVd0uLz7sYw3Rp5Tg", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_smtp_tls_parse() {
        assert_eq!("starttls".parse::<SmtpTls>().unwrap(), SmtpTls::StartTls);
        assert_eq!("TLS".parse::<SmtpTls>().unwrap(), SmtpTls::Tls);
        assert_eq!("none".parse::<SmtpTls>().unwrap(), SmtpTls::None);
        assert!("ssl".parse::<SmtpTls>().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = SiteConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            notifications: NotificationConfig::default(),
            smtp: None,
            sentry_dsn: None,
            sentry_environment: None,
            json_logs: false,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_notification_defaults() {
        let notifications = NotificationConfig::default();
        assert_eq!(notifications.recipient, "info@zip.glass");
        assert_eq!(notifications.sender, "info@zip.glass");
        assert_eq!(notifications.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_smtp_config_debug_redacts_password() {
        let config = SmtpConfig {
            host: "email-smtp.us-east-1.amazonaws.com".to_string(),
            port: 587,
            tls: SmtpTls::StartTls,
            username: Some("AKIAEXAMPLEUSER".to_string()),
            password: Some(SecretString::from("super_secret_smtp_password")),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("email-smtp.us-east-1.amazonaws.com"));
        assert!(debug_output.contains("AKIAEXAMPLEUSER"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }

    #[test]
    fn test_smtp_credentials() {
        let mut config = SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            tls: SmtpTls::None,
            username: Some("mailer".to_string()),
            password: Some(SecretString::from("s3cr3t-Pa55")),
        };
        assert_eq!(config.credentials(), Some(("mailer", "s3cr3t-Pa55")));

        config.password = None;
        assert_eq!(config.credentials(), None);
    }
}
