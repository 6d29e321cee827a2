//! Logging setup.

use std::str::FromStr;

/// Initialize tracing output for demos and embedding applications.
///
/// `default_level` accepts the usual level names (`"info"`, `"debug"`, ...);
/// anything unrecognized falls back to `INFO`.
pub fn init(default_level: &str) {
    let level = tracing::Level::from_str(default_level).unwrap_or(tracing::Level::INFO);

    // try_init so repeated calls (tests, multiple clients) are harmless
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
