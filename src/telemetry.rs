//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,roadmap=debug,learngrid=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Tower HTTP TraceLayer adds the per-request spans; this only installs the subscriber.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,learngrid=debug,roadmap=debug,quiz=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The json and pretty builders are different types, so init in each arm.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
