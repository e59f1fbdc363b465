//! Free-allowance and per-unit rate lookup.
//!
//! Missing (event type, plan) combinations mean "no allowance, no charge".
//! A missing flat plan cost is an error: billing never guesses a price.

use crate::error::BillingError;
use crate::models::{SubscriptionPlan, UsageEventType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Allowance and price for one (event type, plan) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub free_allowance: u64,
    pub rate_per_unit: Decimal,
}

/// Rate and flat-fee tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<(UsageEventType, SubscriptionPlan), RateEntry>,
    plan_costs: HashMap<SubscriptionPlan, Decimal>,
}

/// On-disk layout read by [`RateTable::from_file`].
#[derive(Debug, Deserialize)]
struct RateTableFile {
    #[serde(default)]
    plans: HashMap<String, Decimal>,
    #[serde(default)]
    rates: Vec<RateRow>,
}

#[derive(Debug, Deserialize)]
struct RateRow {
    event_type: String,
    plan: String,
    #[serde(default)]
    free_allowance: u64,
    #[serde(default)]
    rate_per_unit: Decimal,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in platform pricing.
    pub fn standard() -> Self {
        use SubscriptionPlan::{Enterprise, Professional, Starter};
        use UsageEventType::*;

        // (event type, [(allowance, rate in ten-thousandths) per tier])
        let rows: [(UsageEventType, [(u64, i64); 3]); 11] = [
            (ApiCall, [(1_000, 10), (10_000, 8), (100_000, 5)]),
            (WhatsappMessageSent, [(100, 500), (1_000, 400), (10_000, 300)]),
            (WhatsappMessageReceived, [(500, 100), (5_000, 80), (50_000, 50)]),
            (EmailSent, [(1_000, 20), (10_000, 15), (100_000, 10)]),
            (SmsSent, [(50, 1_000), (500, 800), (5_000, 600)]),
            (ContractGenerated, [(10, 20_000), (100, 15_000), (1_000, 10_000)]),
            (InvoiceCreated, [(50, 5_000), (500, 4_000), (5_000, 3_000)]),
            (LeadCreated, [(500, 200), (5_000, 150), (50_000, 100)]),
            (StorageUsed, [(5, 5_000), (50, 4_000), (500, 3_000)]),
            (ReportGenerated, [(20, 2_500), (200, 2_000), (2_000, 1_500)]),
            (WebhookDelivered, [(1_000, 10), (10_000, 8), (100_000, 5)]),
        ];

        let mut table = RateTable::new()
            .with_plan_cost(Starter, Decimal::new(9900, 2))
            .with_plan_cost(Professional, Decimal::new(29900, 2))
            .with_plan_cost(Enterprise, Decimal::new(99900, 2));

        for (event_type, tiers) in rows {
            for (plan, (allowance, rate)) in SubscriptionPlan::ALL.into_iter().zip(tiers) {
                table = table.with_rate(
                    event_type.clone(),
                    plan,
                    allowance,
                    Decimal::new(rate, 4),
                );
            }
        }

        table
    }

    /// Load a table from a TOML/JSON/YAML file (format taken from the extension).
    ///
    /// ```toml
    /// [plans]
    /// starter = "99.00"
    ///
    /// [[rates]]
    /// event_type = "api_call"
    /// plan = "starter"
    /// free_allowance = 1000
    /// rate_per_unit = "0.001"
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BillingError> {
        let path = path.as_ref();
        let file: RateTableFile = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;

        let mut table = RateTable::new();
        for (plan, cost) in file.plans {
            table = table.with_plan_cost(plan.parse()?, cost);
        }
        for row in file.rates {
            if row.rate_per_unit.is_sign_negative() {
                return Err(BillingError::RateTable(format!(
                    "negative rate for {}/{}",
                    row.event_type, row.plan
                )));
            }
            table = table.with_rate(
                UsageEventType::from_string(&row.event_type),
                row.plan.parse()?,
                row.free_allowance,
                row.rate_per_unit,
            );
        }

        tracing::info!(
            path = %path.display(),
            rates = table.rates.len(),
            plans = table.plan_costs.len(),
            "Rate table loaded"
        );
        Ok(table)
    }

    pub fn with_rate(
        mut self,
        event_type: UsageEventType,
        plan: SubscriptionPlan,
        free_allowance: u64,
        rate_per_unit: Decimal,
    ) -> Self {
        self.rates.insert(
            (event_type, plan),
            RateEntry {
                free_allowance,
                rate_per_unit,
            },
        );
        self
    }

    pub fn with_plan_cost(mut self, plan: SubscriptionPlan, cost: Decimal) -> Self {
        self.plan_costs.insert(plan, cost);
        self
    }

    pub fn entry(&self, event_type: &UsageEventType, plan: SubscriptionPlan) -> Option<RateEntry> {
        // HashMap lookup needs an owned key for the tuple.
        self.rates.get(&(event_type.clone(), plan)).copied()
    }

    pub fn free_allowance(&self, event_type: &UsageEventType, plan: SubscriptionPlan) -> u64 {
        self.entry(event_type, plan)
            .map(|e| e.free_allowance)
            .unwrap_or(0)
    }

    pub fn rate_per_unit(&self, event_type: &UsageEventType, plan: SubscriptionPlan) -> Decimal {
        self.entry(event_type, plan)
            .map(|e| e.rate_per_unit)
            .unwrap_or(Decimal::ZERO)
    }

    /// Flat monthly subscription charge for a plan.
    pub fn plan_cost(&self, plan: SubscriptionPlan) -> Result<Decimal, BillingError> {
        self.plan_costs
            .get(&plan)
            .copied()
            .ok_or_else(|| BillingError::MissingPlanCost(plan.as_str().to_string()))
    }

    /// Entries where a higher tier gets fewer free units or a higher price
    /// than the tier below. Reported, never enforced.
    pub fn tier_monotonicity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut keys: Vec<&(UsageEventType, SubscriptionPlan)> = self.rates.keys().collect();
        keys.sort();

        for (event_type, plan) in keys {
            let Some(next) = plan.next_tier() else {
                continue;
            };
            let (Some(lower), Some(higher)) =
                (self.entry(event_type, *plan), self.entry(event_type, next))
            else {
                continue;
            };

            if higher.free_allowance < lower.free_allowance {
                warnings.push(format!(
                    "{}: {} allowance {} is below {} allowance {}",
                    event_type, next, higher.free_allowance, plan, lower.free_allowance
                ));
            }
            if higher.rate_per_unit > lower.rate_per_unit {
                warnings.push(format!(
                    "{}: {} rate {} is above {} rate {}",
                    event_type, next, higher.rate_per_unit, plan, lower.rate_per_unit
                ));
            }
        }

        warnings
    }
}
