//! Metrics recording implementation using Prometheus.

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records an authentication attempt with its outcome.
    fn record_auth_attempt(&self, result: &str, scheme: &str);

    /// Records how long verifying a request took.
    fn record_auth_duration(&self, duration_secs: f64, result: &str, scheme: &str);
}

/// Prometheus metrics collector backed by a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    auth_requests_total: CounterVec,
    auth_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let auth_requests_total = CounterVec::new(
            Opts::new(
                "auth_requests_total",
                "Total number of authentication attempts",
            ),
            &["result", "scheme"],
        )?;
        registry.register(Box::new(auth_requests_total.clone()))?;

        // Verification is pure CPU work, so the buckets stay sub-second.
        let auth_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "auth_duration_seconds",
                "Authentication verification duration in seconds",
            )
            .buckets(vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
            ]),
            &["result", "scheme"],
        )?;
        registry.register(Box::new(auth_duration_seconds.clone()))?;

        Ok(Metrics {
            registry,
            auth_requests_total,
            auth_duration_seconds,
        })
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl MetricsRecorder for Metrics {
    fn record_auth_attempt(&self, result: &str, scheme: &str) {
        self.auth_requests_total
            .with_label_values(&[result, scheme])
            .inc();
    }

    fn record_auth_duration(&self, duration_secs: f64, result: &str, scheme: &str) {
        self.auth_duration_seconds
            .with_label_values(&[result, scheme])
            .observe(duration_secs);
    }
}
