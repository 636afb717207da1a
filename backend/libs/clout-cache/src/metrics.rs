//! Cache metrics for observability

use prometheus::{CounterVec, Opts, Registry};
use std::sync::OnceLock;

static METRICS: OnceLock<CacheMetricsInner> = OnceLock::new();

struct CacheMetricsInner {
    hits: CounterVec,
    misses: CounterVec,
    coalesced: CounterVec,
    fetch_errors: CounterVec,
    patches: CounterVec,
    resets: CounterVec,
}

fn counter(name: &str, help: &str) -> CounterVec {
    CounterVec::new(Opts::new(name, help), &["resource"]).expect("valid metric definition")
}

impl CacheMetricsInner {
    fn new() -> Self {
        Self {
            hits: counter("clout_cache_hits_total", "Total fresh cache hits"),
            misses: counter(
                "clout_cache_misses_total",
                "Total reads that started a fetch",
            ),
            coalesced: counter(
                "clout_cache_coalesced_total",
                "Total reads attached to an in-flight fetch",
            ),
            fetch_errors: counter("clout_cache_fetch_errors_total", "Total failed fetches"),
            patches: counter(
                "clout_cache_patches_total",
                "Total in-place patches of cached values",
            ),
            resets: counter("clout_cache_resets_total", "Total cache resets"),
        }
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.hits.clone()))?;
        registry.register(Box::new(self.misses.clone()))?;
        registry.register(Box::new(self.coalesced.clone()))?;
        registry.register(Box::new(self.fetch_errors.clone()))?;
        registry.register(Box::new(self.patches.clone()))?;
        registry.register(Box::new(self.resets.clone()))?;
        Ok(())
    }
}

fn get_metrics() -> &'static CacheMetricsInner {
    METRICS.get_or_init(CacheMetricsInner::new)
}

/// Cache metrics wrapper, labelled by resource name (`user`, `exchange_rate`, ...)
#[derive(Clone, Default)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Register metrics with a Prometheus registry
    pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
        get_metrics().register(registry)
    }

    pub fn record_hit(&self, resource: &str) {
        get_metrics().hits.with_label_values(&[resource]).inc();
    }

    pub fn record_miss(&self, resource: &str) {
        get_metrics().misses.with_label_values(&[resource]).inc();
    }

    pub fn record_coalesced(&self, resource: &str) {
        get_metrics().coalesced.with_label_values(&[resource]).inc();
    }

    pub fn record_fetch_error(&self, resource: &str) {
        get_metrics().fetch_errors.with_label_values(&[resource]).inc();
    }

    pub fn record_patch(&self, resource: &str) {
        get_metrics().patches.with_label_values(&[resource]).inc();
    }

    pub fn record_reset(&self, resource: &str) {
        get_metrics().resets.with_label_values(&[resource]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment_per_resource() {
        let metrics = CacheMetrics::new();
        let before = get_metrics()
            .hits
            .with_label_values(&["metrics_test"])
            .get();

        metrics.record_hit("metrics_test");
        metrics.record_hit("metrics_test");

        let after = get_metrics()
            .hits
            .with_label_values(&["metrics_test"])
            .get();
        assert_eq!(after - before, 2.0);
    }

    #[test]
    fn test_register_with_registry() {
        let registry = Registry::new();
        CacheMetrics::register(&registry).unwrap();

        CacheMetrics::new().record_miss("metrics_register_test");
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "clout_cache_misses_total"));
    }
}
