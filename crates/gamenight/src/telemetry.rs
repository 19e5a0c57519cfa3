//! Log output setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "gamenight=info";

/// Installs a formatted `tracing` subscriber for the whole process.
///
/// The level comes from `RUST_LOG` when it parses, otherwise
/// [`DEFAULT_DIRECTIVE`]. Calling this more than once is harmless; only
/// the first call installs anything. Returns whether this call did.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
