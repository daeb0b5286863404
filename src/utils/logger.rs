/// Logging setup for the binary
use env_logger::Env;
use std::sync::OnceLock;

static VERBOSE: OnceLock<bool> = OnceLock::new();

/// Initialize `env_logger`. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let initialized = env_logger::Builder
        ::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();

    if initialized.is_ok() {
        let _ = VERBOSE.set(verbose);
        log::debug!("🐛 Debug logging enabled");
    }
}

/// Check if verbose output was requested
pub fn is_verbose() -> bool {
    *VERBOSE.get().unwrap_or(&false)
}
