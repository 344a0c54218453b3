//! Logging initialization for embedders.
//!
//! The core only emits `tracing` events; how they get anywhere is the host
//! process's call. `init` is a convenient default for binaries and tests.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns an error if a global subscriber is already set; tests that call
/// this repeatedly should use [`try_init`] semantics and ignore the failure.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set subscriber: {e}"))?;
    Ok(())
}
