//! Metrics module for billing-service.
//! Provides Prometheus metrics for usage pricing and cycle finalization.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_counter_vec, register_histogram_vec,
    register_int_counter_vec, CounterVec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// Cycle finalization duration histogram
pub static CYCLE_FINALIZE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "billing_cycle_finalize_duration_seconds",
            "Billing cycle finalization duration",
            vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
        ),
        &["plan"]
    )
    .expect("Failed to register CYCLE_FINALIZE_DURATION")
});

/// Usage summaries computed, by event type and plan
pub static USAGE_SUMMARIES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Cycle finalizations by plan and outcome
pub static CYCLE_FINALIZATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Charge amount counter by plan (monetary tracking)
pub static CHARGE_AMOUNT_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    USAGE_SUMMARIES_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "billing_usage_summaries_total",
                "Total usage summaries computed by event type and plan"
            ),
            &["event_type", "plan"]
        )
        .expect("Failed to register USAGE_SUMMARIES_TOTAL")
    });

    CYCLE_FINALIZATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "billing_cycle_finalizations_total",
                "Total billing cycle finalizations by plan and status"
            ),
            &["plan", "status"]
        )
        .expect("Failed to register CYCLE_FINALIZATIONS_TOTAL")
    });

    // Charge amount counter for financial tracking
    CHARGE_AMOUNT_TOTAL.get_or_init(|| {
        register_counter_vec!(
            opts!(
                "billing_charge_amount_total",
                "Total charge amount by plan and type"
            ),
            &["plan", "charge_type"]
        )
        .expect("Failed to register CHARGE_AMOUNT_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*CYCLE_FINALIZE_DURATION;
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

/// Record a computed usage summary.
pub fn record_usage_summary(event_type: &str, plan: &str) {
    if let Some(counter) = USAGE_SUMMARIES_TOTAL.get() {
        counter.with_label_values(&[event_type, plan]).inc();
    }
}

/// Record a cycle finalization outcome.
pub fn record_cycle_finalization(plan: &str, status: &str) {
    if let Some(counter) = CYCLE_FINALIZATIONS_TOTAL.get() {
        counter.with_label_values(&[plan, status]).inc();
    }
}

/// Record how long a finalization took.
pub fn record_finalize_duration(plan: &str, duration_secs: f64) {
    CYCLE_FINALIZE_DURATION
        .with_label_values(&[plan])
        .observe(duration_secs);
}

/// Record a charge amount for financial tracking.
pub fn record_charge_amount(plan: &str, charge_type: &str, amount: Decimal) {
    if let Some(counter) = CHARGE_AMOUNT_TOTAL.get() {
        let amount = amount.to_f64().unwrap_or(0.0);
        counter
            .with_label_values(&[plan, charge_type])
            .inc_by(amount.abs());
    }
}
