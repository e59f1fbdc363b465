//! Metrics module for contract-service.
//! Provides Prometheus counters for hashing and integrity verification.

use prometheus::{
    opts, register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};
use std::sync::OnceLock;

/// Contract hashes computed
pub static CONTRACT_HASHES_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Integrity verifications by outcome (match, mismatch, malformed)
pub static INTEGRITY_VERIFICATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    CONTRACT_HASHES_TOTAL.get_or_init(|| {
        register_int_counter!(opts!(
            "contract_hashes_total",
            "Total contract content hashes computed"
        ))
        .expect("Failed to register CONTRACT_HASHES_TOTAL")
    });

    INTEGRITY_VERIFICATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "contract_integrity_verifications_total",
                "Total integrity verifications by outcome"
            ),
            &["outcome"]
        )
        .expect("Failed to register INTEGRITY_VERIFICATIONS_TOTAL")
    });
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record a computed hash.
pub fn record_hash_generated() {
    if let Some(counter) = CONTRACT_HASHES_TOTAL.get() {
        counter.inc();
    }
}

/// Record a verification outcome.
pub fn record_verification(outcome: &str) {
    if let Some(counter) = INTEGRITY_VERIFICATIONS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
