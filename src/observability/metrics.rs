use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use tracing::info;
use std::sync::{Arc, OnceLock};


// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Gets a reference to the process wide `Metrics`, initializing it on first use.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Exchange metrics
    pub exchange_requests: IntCounterVec,
    pub exchange_failures: IntCounterVec,
    pub exchange_duration: HistogramVec,

    // Cache metrics
    pub cache_hits: IntCounterVec,
    pub token_expiry_unix: IntGaugeVec,

    // Runtime
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let metrics = Self::build().unwrap_or_else(|e| {
            panic!("metric definitions are static and must register: {e}")
        });
        Arc::new(metrics)
    }

    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("satokenagent".into()), None)?;

        let metrics = Self {
            // Exchange
            exchange_requests: IntCounterVec::new(Opts::new("exchange_requests_total", "Token exchanges attempted by token kind"), &["kind"])?,
            exchange_failures: IntCounterVec::new(Opts::new("exchange_failures_total", "Token exchange failures by reason"), &["kind", "reason"])?,
            exchange_duration: HistogramVec::new(HistogramOpts::new("exchange_duration_seconds", "Token exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["kind"])?,

            // Cache
            cache_hits: IntCounterVec::new(Opts::new("cache_hits_total", "Requests answered from the cache"), &["kind"])?,
            token_expiry_unix: IntGaugeVec::new(Opts::new("token_expiry_unix_seconds", "Expiry timestamp of the cached token"), &["kind"])?,

            up: IntGauge::new("up", "1 if service is healthy")?,

            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.exchange_requests.clone()))?;
        reg.register(Box::new(metrics.exchange_failures.clone()))?;
        reg.register(Box::new(metrics.exchange_duration.clone()))?;
        reg.register(Box::new(metrics.cache_hits.clone()))?;
        reg.register(Box::new(metrics.token_expiry_unix.clone()))?;
        reg.register(Box::new(metrics.up.clone()))?;

        Ok(metrics)
    }
}
