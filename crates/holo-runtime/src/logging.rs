//! Tracing subscriber setup for the binary

use holo_core::{HoloError, HoloResult};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// Filter from `RUST_LOG`, `info` when unset. `json` switches to one JSON
/// object per line.
pub fn init_logging(json: bool) -> HoloResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    result.map_err(|e| HoloError::Config(format!("logging: {e}")))
}
