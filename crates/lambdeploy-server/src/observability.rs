//! Tracing setup shared by `lambdeploy-server` and the `lambdeploy` CLI.
//!
//! Events are written to stderr; the CLI reserves stdout for the response
//! envelope. The filter comes from `RUST_LOG` when it is set, otherwise from a
//! level the binary passes in, and can be switched to `logging.level` once the
//! configuration has been read.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER: OnceLock<FilterHandle> = OnceLock::new();

/// Install the global subscriber. Only the first call has an effect.
pub fn install(fallback_level: &str) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let initial = initial_filter(rust_log.as_deref(), fallback_level);
    let (filter, handle) = reload::Layer::new(initial);
    if FILTER.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Switch to the configured level. Ignored when `RUST_LOG` is set or the
/// subscriber was never installed.
pub fn set_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = FILTER.get() {
        if let Err(err) = handle.reload(EnvFilter::new(level)) {
            tracing::warn!(%err, level, "Could not change log level");
        }
    }
}

fn initial_filter(rust_log: Option<&str>, fallback_level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback_level))
}
