//! Log output for the binary.
//!
//! ## Log Levels
//!
//! - **INFO**: request scale, solver status, objective
//! - **DEBUG**: per-rule emission counts, backend details
//! - **WARN**: duplicate inputs, rejected incumbents

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber; `RUST_LOG` overrides the default filter.
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("shiftopt=info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
