use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Tip requests by protocol outcome: challenge, invalid_header,
/// verify_rejected, settle_rejected, facilitator_error, fulfilled.
pub static TIP_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("piggybank_tip_requests_total", "Tip requests by outcome"),
        &["outcome"],
    )
    .unwrap()
});

pub static DONATIONS_RECORDED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "piggybank_donations_recorded_total",
        "Donations written to the ledger",
    )
    .unwrap()
});

/// Settled payments whose ledger write failed — each needs manual
/// reconciliation against the facilitator's records.
pub static DONATION_WRITE_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "piggybank_donation_write_failures_total",
        "Post-settlement ledger write failures",
    )
    .unwrap()
});

pub static RECIPIENTS_REGISTERED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "piggybank_recipients_registered_total",
        "Recipient profiles created",
    )
    .unwrap()
});

pub static SETTLE_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "piggybank_settle_latency_seconds",
            "Facilitator settle call latency",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Register all metrics with the registry.
pub fn register_metrics() {
    REGISTRY.register(Box::new(TIP_REQUESTS.clone())).unwrap();
    REGISTRY
        .register(Box::new(DONATIONS_RECORDED.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(DONATION_WRITE_FAILURES.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(RECIPIENTS_REGISTERED.clone()))
        .unwrap();
    REGISTRY.register(Box::new(SETTLE_LATENCY.clone())).unwrap();
}

/// Render the registry in Prometheus text format.
pub fn metrics_output() -> String {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
