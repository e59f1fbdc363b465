//! Services module for billing-service.

pub mod aggregation;
pub mod calculator;
pub mod finalizer;
pub mod metrics;
pub mod rates;
pub mod repository;

pub use aggregation::aggregate_usage;
pub use calculator::UsageCalculator;
pub use finalizer::CycleFinalizer;
pub use metrics::{
    get_metrics, init_metrics, record_charge_amount, record_cycle_finalization,
    record_finalize_duration, record_usage_summary,
};
pub use rates::{RateEntry, RateTable};
pub use repository::{CycleRepository, InMemoryCycleRepository};
