//! Prometheus metrics for pantry.
//!
//! Request rate, errors and latency per route, plus counters for the
//! records users create and the validation failures they hit.

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
    TextEncoder,
};

/// Registry with every application metric.
pub struct Metrics {
    registry: Registry,

    /// HTTP requests by method, route and status
    pub http_requests_total: CounterVec,

    /// HTTP request duration in seconds
    pub http_request_duration_seconds: HistogramVec,

    /// Connections currently open on the main listener
    pub http_connections_active: Gauge,

    pub recipes_created_total: IntCounter,
    pub notes_created_total: IntCounter,
    pub users_created_total: IntCounter,

    /// Rejected form submissions by the field that failed
    pub validation_failures_total: CounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_buckets = vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ];

        let http_requests_total = CounterVec::new(
            Opts::new("pantry_http_requests_total", "Total HTTP requests"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pantry_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(http_buckets),
            &["method", "route"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let http_connections_active =
            Gauge::new("pantry_http_connections_active", "Active HTTP connections")?;
        registry.register(Box::new(http_connections_active.clone()))?;

        let recipes_created_total =
            IntCounter::new("pantry_recipes_created_total", "Recipes created")?;
        registry.register(Box::new(recipes_created_total.clone()))?;

        let notes_created_total = IntCounter::new("pantry_notes_created_total", "Notes created")?;
        registry.register(Box::new(notes_created_total.clone()))?;

        let users_created_total =
            IntCounter::new("pantry_users_created_total", "Accounts registered")?;
        registry.register(Box::new(users_created_total.clone()))?;

        let validation_failures_total = CounterVec::new(
            Opts::new(
                "pantry_validation_failures_total",
                "Form submissions rejected by validation",
            ),
            &["field"],
        )?;
        registry.register(Box::new(validation_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_connections_active,
            recipes_created_total,
            notes_created_total,
            users_created_total,
            validation_failures_total,
        })
    }

    /// Record one served request. `route` is the route label, never the raw path.
    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, route, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration_secs);
    }

    pub fn record_validation_failure(&self, field: &str) {
        self.validation_failures_total
            .with_label_values(&[field])
            .inc();
    }

    pub fn inc_connections(&self) {
        self.http_connections_active.inc();
    }

    pub fn dec_connections(&self) {
        self.http_connections_active.dec();
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.export().unwrap().contains("# HELP"));
    }

    #[test]
    fn test_http_request_recording() {
        let metrics = Metrics::new().unwrap();
        metrics.record_http_request("POST", "recipes_new", 303, 0.01);

        let output = metrics.export().unwrap();
        assert!(output.contains("pantry_http_requests_total"));
        assert!(output.contains(r#"route="recipes_new""#));
        assert!(output.contains(r#"status="303""#));
    }

    #[test]
    fn test_validation_failures_by_field() {
        let metrics = Metrics::new().unwrap();
        metrics.record_validation_failure("quantities");
        metrics.record_validation_failure("quantities");
        metrics.recipes_created_total.inc();

        let output = metrics.export().unwrap();
        assert!(output.contains(r#"pantry_validation_failures_total{field="quantities"} 2"#));
        assert!(output.contains("pantry_recipes_created_total 1"));
    }
}
