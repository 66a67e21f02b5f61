//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / handlers / config produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → whatever subscriber / recorder the firmware installs
//! ```
//!
//! # Design Decisions
//! - Request ID is a field on every dispatch event
//! - Metrics are cheap (atomic increments, no-op without a recorder)
//! - The library never installs a metrics exporter itself

pub mod logging;
pub mod metrics;

use crate::config::ObservabilityConfig;

/// Apply observability settings: install the log subscriber and switch
/// metrics on or off. Returns false if a subscriber was already installed.
pub fn init(config: &ObservabilityConfig) -> bool {
    metrics::set_enabled(config.metrics_enabled);
    logging::init(config)
}
