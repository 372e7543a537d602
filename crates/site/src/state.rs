//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::NotificationConfig;
use crate::services::Mailer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Nothing in it is mutable, so
/// concurrent submissions never contend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    notifications: NotificationConfig,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `notifications` - Quote notification addresses and delivery timeout
    /// * `mailer` - Backend used to deliver notifications
    #[must_use]
    pub fn new(notifications: NotificationConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                notifications,
                mailer,
            }),
        }
    }

    /// Get a reference to the notification settings.
    #[must_use]
    pub fn notifications(&self) -> &NotificationConfig {
        &self.inner.notifications
    }

    /// Get a reference to the mail backend.
    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}
