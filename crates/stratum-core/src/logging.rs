//! Logging integration for the stratum engine.
//!
//! Provides a helper for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings).

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter directive is read from `settings.log_level` (e.g. "debug",
/// "info", "stratum=trace"). In debug mode a pretty, human-readable format is
/// used; otherwise a structured JSON format is used. Installing a second
/// subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one migration application step.
///
/// Attach this span around plan execution so that all log entries emitted
/// while applying a migration carry its key.
///
/// # Examples
///
/// ```
/// use stratum_core::logging::migration_span;
///
/// let span = migration_span("blog", "0001_initial");
/// let _guard = span.enter();
/// tracing::info!("applying");
/// ```
pub fn migration_span(app_label: &str, name: &str) -> tracing::Span {
    tracing::info_span!("migration", app = app_label, name = name)
}
