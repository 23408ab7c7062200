//! poll-engine: discovery and telemetry polling for soil-moisture sensors
//!
//! A single long-lived task scans the radio on a fixed cadence, reads a
//! moisture value from each discovered sensor with per-device failure
//! isolation, and reconciles the results into the device registry. Device
//! failures degrade to a stale reading; cycle failures are logged and the
//! loop continues. Only an explicit stop signal ends the engine.

mod config;
pub use config::{PollConfig, MOISTURE_CHARACTERISTIC, MOISTURE_SERVICE};

mod error;
pub use error::{CycleError, ReadError};

mod fetch;
pub use fetch::TelemetryFetcher;

mod reconcile;
pub use reconcile::reconcile;

mod scheduler;
pub use scheduler::PollScheduler;

mod metrics;
pub use metrics::{MetricsHub, PollMetrics};
