//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a process-wide fmt subscriber filtered by `RUST_LOG`,
/// defaulting to `info`. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
