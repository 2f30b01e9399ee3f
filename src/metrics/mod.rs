// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the checkout engine
// ============================================================================
//
// Provides metrics for:
// - Commands published on the command stream
// - Validation calls per handler (count, failures, latency, outcome)
// - Navigation decisions (step, issues, basket recovery, superseded, cancelled)
// - Subscribers falling behind the stream
//
// Each engine owns its registry, so several engines can live in one process.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Command stream
    pub commands_published: IntCounterVec,
    pub bus_lagged: IntCounterVec,

    // Validation calls
    pub validation_calls: IntCounterVec,
    pub validation_failures: IntCounterVec,
    pub validation_outcomes: IntCounterVec,
    pub validation_duration: HistogramVec,

    // Navigation
    pub navigations: IntCounterVec,
    pub navigations_superseded: IntCounter,
    pub navigations_cancelled: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let commands_published = IntCounterVec::new(
            Opts::new("checkout_commands_published_total", "Commands published by engine handlers"),
            &["handler", "command_type"],
        )?;
        registry.register(Box::new(commands_published.clone()))?;

        let bus_lagged = IntCounterVec::new(
            Opts::new("checkout_bus_lagged_total", "Commands skipped by subscribers that fell behind"),
            &["subscriber"],
        )?;
        registry.register(Box::new(bus_lagged.clone()))?;

        let validation_calls = IntCounterVec::new(
            Opts::new("checkout_validation_calls_total", "Basket validation calls issued"),
            &["handler"],
        )?;
        registry.register(Box::new(validation_calls.clone()))?;

        let validation_failures = IntCounterVec::new(
            Opts::new("checkout_validation_failures_total", "Basket validation calls that failed"),
            &["handler", "code"],
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let validation_outcomes = IntCounterVec::new(
            Opts::new("checkout_validation_outcomes_total", "Successful validations by outcome"),
            &["handler", "outcome"],
        )?;
        registry.register(Box::new(validation_outcomes.clone()))?;

        let validation_duration = HistogramVec::new(
            HistogramOpts::new("checkout_validation_duration_seconds", "Basket validation call duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["handler"],
        )?;
        registry.register(Box::new(validation_duration.clone()))?;

        let navigations = IntCounterVec::new(
            Opts::new("checkout_navigations_total", "Navigations issued by the engine"),
            &["kind"],
        )?;
        registry.register(Box::new(navigations.clone()))?;

        let navigations_superseded = IntCounter::new(
            "checkout_navigations_superseded_total",
            "Pending navigations replaced by a newer outcome before settling",
        )?;
        registry.register(Box::new(navigations_superseded.clone()))?;

        let navigations_cancelled = IntCounter::new(
            "checkout_navigations_cancelled_total",
            "Pending navigations dropped because the basket was gone",
        )?;
        registry.register(Box::new(navigations_cancelled.clone()))?;

        Ok(Self {
            registry,
            commands_published,
            bus_lagged,
            validation_calls,
            validation_failures,
            validation_outcomes,
            validation_duration,
            navigations,
            navigations_superseded,
            navigations_cancelled,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_published(&self, handler: &str, command_type: &str) {
        self.commands_published.with_label_values(&[handler, command_type]).inc();
    }

    pub fn record_lag(&self, subscriber: &str, skipped: u64) {
        self.bus_lagged.with_label_values(&[subscriber]).inc_by(skipped);
    }

    pub fn record_validation_call(&self, handler: &str) {
        self.validation_calls.with_label_values(&[handler]).inc();
    }

    pub fn record_validation_result(&self, handler: &str, duration_secs: f64, outcome: Result<&str, &str>) {
        match outcome {
            Ok(outcome) => self.validation_outcomes.with_label_values(&[handler, outcome]).inc(),
            Err(code) => self.validation_failures.with_label_values(&[handler, code]).inc(),
        }
        self.validation_duration.with_label_values(&[handler]).observe(duration_secs);
    }

    pub fn record_navigation(&self, kind: &str) {
        self.navigations.with_label_values(&[kind]).inc();
    }

    pub fn record_superseded(&self) {
        self.navigations_superseded.inc();
    }

    pub fn record_cancelled(&self) {
        self.navigations_cancelled.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_validation_call("h");
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_engines_do_not_share_registries() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.record_validation_call("continue_checkout");
        first.record_validation_call("continue_checkout");

        assert_eq!(first.validation_calls.with_label_values(&["continue_checkout"]).get(), 2);
        assert_eq!(second.validation_calls.with_label_values(&["continue_checkout"]).get(), 0);
    }

    #[test]
    fn test_validation_result_split_by_outcome() {
        let metrics = Metrics::new().unwrap();
        metrics.record_validation_result("validate_basket", 0.02, Ok("valid"));
        metrics.record_validation_result("validate_basket", 0.5, Err("basket.not_found.error"));

        assert_eq!(
            metrics.validation_outcomes.with_label_values(&["validate_basket", "valid"]).get(),
            1
        );
        assert_eq!(
            metrics
                .validation_failures
                .with_label_values(&["validate_basket", "basket.not_found.error"])
                .get(),
            1
        );
        assert_eq!(
            metrics.validation_duration.with_label_values(&["validate_basket"]).get_sample_count(),
            2
        );
    }

    #[test]
    fn test_navigation_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_navigation("step");
        metrics.record_superseded();
        metrics.record_cancelled();

        assert_eq!(metrics.navigations.with_label_values(&["step"]).get(), 1);
        assert_eq!(metrics.navigations_superseded.get(), 1);
        assert_eq!(metrics.navigations_cancelled.get(), 1);
    }
}
