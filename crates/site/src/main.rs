//! Zip Glass site - quote submission backend.
//!
//! This binary serves the submission API (port 5000 by default). Pages are
//! rendered elsewhere and post quote requests to `/api/send-quote`.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Shared validation rules from `zip-glass-core`
//! - Askama templates for notification bodies
//! - SMTP (lettre) or log-only delivery, chosen by configuration
//!
//! Nothing is persisted. A quote lives for one request.

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zip_glass_site::config::SiteConfig;
use zip_glass_site::services::mailer;
use zip_glass_site::state::AppState;

/// Start Sentry when a DSN is configured. The guard flushes events on drop.
///
/// Submissions carry names, phone numbers and addresses, so default PII
/// collection stays off.
fn init_sentry(dsn: Option<&str>, environment: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: environment.map(|env| env.to_owned().into()),
        send_default_pii: false,
        attach_stacktrace: true,
        ..Default::default()
    };

    let guard = sentry::init((dsn?, options));
    tracing::info!(environment = environment.unwrap_or("default"), "Sentry enabled");
    Some(guard)
}

/// Module whose warnings only describe bad submissions.
const REJECTION_TARGET: &str = "zip_glass_site::error";

/// Decide what each tracing event becomes in Sentry.
///
/// Errors and delivery warnings are reported. Rejected submissions are the
/// submitter's mistake, so like info and debug they only leave a breadcrumb.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    let level = *metadata.level();

    if level == tracing::Level::ERROR
        || (level == tracing::Level::WARN && metadata.target() != REJECTION_TARGET)
    {
        sentry_tracing::EventFilter::Event
    } else if level == tracing::Level::TRACE {
        sentry_tracing::EventFilter::Ignore
    } else {
        sentry_tracing::EventFilter::Breadcrumb
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = SiteConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(
        config.sentry_dsn.as_deref(),
        config.sentry_environment.as_deref(),
    );

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zip_glass_site=info,tower_http=debug".into());

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let mailer = mailer::from_config(&config).expect("Failed to create mailer");
    tracing::info!(
        mailer = mailer.name(),
        recipient = %config.notifications.recipient,
        "Mailer ready"
    );

    let state = AppState::new(config.notifications.clone(), mailer);

    let app = zip_glass_site::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("site listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve once the process is asked to stop, so in-flight submissions can
/// finish sending.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Ctrl+C handler failed");
            }
            "ctrl-c"
        }
        () = terminate => "SIGTERM",
    };

    tracing::info!(signal, "Shutting down, draining in-flight requests");
}
