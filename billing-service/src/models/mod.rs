//! Domain models for billing-service.

mod cycle;
mod event_type;
mod plan;
mod usage;

pub use cycle::{BillingCycle, BillingCycleStatus, BillingPeriod, CycleChargeResult, CycleUpdate};
pub use event_type::UsageEventType;
pub use plan::SubscriptionPlan;
pub use usage::{CategoryTotals, RecordUsage, TierBand, UsageEvent, UsageSummary};
