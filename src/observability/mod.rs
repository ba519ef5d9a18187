//! Structured logging setup.
//!
//! Logs go to stderr so stdout carries only the search result.

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "wikipath=debug"
    } else {
        "wikipath=info"
    }
}

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Call once at program startup; subsequent calls are silently ignored by
/// `tracing_subscriber`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
