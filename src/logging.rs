//! Tracing subscriber setup for binaries embedding the library.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "entity_sdk=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `DEFAULT_DIRECTIVE`.
/// A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
