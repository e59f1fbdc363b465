//! Billing cycle model.

use super::{SubscriptionPlan, UsageEventType, UsageSummary};
use crate::error::BillingError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Billing cycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycleStatus {
    Active,
    Processing,
    Completed,
    Failed,
}

impl BillingCycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycleStatus::Active => "active",
            BillingCycleStatus::Processing => "processing",
            BillingCycleStatus::Completed => "completed",
            BillingCycleStatus::Failed => "failed",
        }
    }

    /// active -> processing -> completed | failed. Nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: BillingCycleStatus) -> bool {
        matches!(
            (self, next),
            (BillingCycleStatus::Active, BillingCycleStatus::Processing)
                | (BillingCycleStatus::Processing, BillingCycleStatus::Completed)
                | (BillingCycleStatus::Processing, BillingCycleStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BillingCycleStatus::Completed | BillingCycleStatus::Failed
        )
    }
}

impl FromStr for BillingCycleStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BillingCycleStatus::Active),
            "processing" => Ok(BillingCycleStatus::Processing),
            "completed" => Ok(BillingCycleStatus::Completed),
            "failed" => Ok(BillingCycleStatus::Failed),
            other => Err(BillingError::UnknownStatus(other.to_string())),
        }
    }
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    /// Build a period without checking it; see [`BillingPeriod::validate`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Calendar month period.
    pub fn monthly(year: i32, month: u32) -> Result<Self, BillingError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            BillingError::InvalidPeriod(format!("no such month {}-{:02}", year, month))
        })?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(|| {
            BillingError::InvalidPeriod(format!("month {}-{:02} has no end", year, month))
        })?;

        Ok(Self { start, end })
    }

    /// Calendar month containing `at`.
    pub fn month_of(at: DateTime<Utc>) -> Result<Self, BillingError> {
        Self::monthly(at.year(), at.month())
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(BillingError::InvalidPeriod(format!(
                "start {} is not before end {}",
                self.start, self.end
            )))
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start <= day && day < self.end
    }
}

/// Result of pricing a full billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleChargeResult {
    pub tenant_id: Uuid,
    pub period: BillingPeriod,
    pub plan: SubscriptionPlan,
    pub summaries: Vec<UsageSummary>,
    pub usage_total: Decimal,
    pub subscription_charge: Decimal,
    pub grand_total: Decimal,
}

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl CycleChargeResult {
    pub fn summary_for(&self, event_type: &UsageEventType) -> Option<&UsageSummary> {
        self.summaries.iter().find(|s| &s.event_type == event_type)
    }

    /// Copy with every amount rounded to cents, for invoices and display.
    ///
    /// Totals are rounded from the full-precision values, so the rounded
    /// summaries may not add up to the rounded usage total by a cent.
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        for summary in &mut out.summaries {
            summary.total_charge = round_currency(summary.total_charge);
            for band in &mut summary.tier_breakdown {
                band.charge = round_currency(band.charge);
            }
        }
        out.usage_total = round_currency(self.usage_total);
        out.subscription_charge = round_currency(self.subscription_charge);
        out.grand_total = round_currency(self.grand_total);
        out
    }
}

/// Billing cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingCycle {
    pub cycle_id: Uuid,
    pub tenant_id: Uuid,
    pub period: BillingPeriod,
    /// Plan value as stored by the caller; parsed at finalization.
    pub plan: String,
    pub status: BillingCycleStatus,
    /// 1 for the first attempt, incremented on every retry.
    pub attempt: u32,
    pub previous_cycle_id: Option<Uuid>,
    pub result: Option<CycleChargeResult>,
    pub failure_reason: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl BillingCycle {
    pub fn open(tenant_id: Uuid, period: BillingPeriod, plan: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            cycle_id: Uuid::new_v4(),
            tenant_id,
            period,
            plan: plan.into(),
            status: BillingCycleStatus::Active,
            attempt: 1,
            previous_cycle_id: None,
            result: None,
            failure_reason: None,
            created_utc: now,
            updated_utc: now,
        }
    }

    /// Fresh attempt for the same tenant and period as a failed cycle.
    pub fn retry_of(failed: &BillingCycle, plan: impl Into<String>) -> Self {
        let mut cycle = Self::open(failed.tenant_id, failed.period, plan);
        cycle.attempt = failed.attempt + 1;
        cycle.previous_cycle_id = Some(failed.cycle_id);
        cycle
    }
}

/// Conditional update applied by a repository transition.
#[derive(Debug, Clone)]
pub struct CycleUpdate {
    pub status: BillingCycleStatus,
    pub result: Option<CycleChargeResult>,
    pub failure_reason: Option<String>,
}

impl CycleUpdate {
    pub fn processing() -> Self {
        Self {
            status: BillingCycleStatus::Processing,
            result: None,
            failure_reason: None,
        }
    }

    pub fn completed(result: CycleChargeResult) -> Self {
        Self {
            status: BillingCycleStatus::Completed,
            result: Some(result),
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: BillingCycleStatus::Failed,
            result: None,
            failure_reason: Some(reason.into()),
        }
    }
}
