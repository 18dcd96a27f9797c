//! Metrics collection and exposition for Prometheus.
//!
//! Counts authentication outcomes per scheme and times each verification.

mod recorder;

pub use recorder::{Metrics, MetricsRecorder};
