//! Usage event and usage summary models.

use super::UsageEventType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Recorded usage event. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub event_id: Uuid,
    pub tenant_id: Uuid,
    pub event_type: UsageEventType,
    pub quantity: u64,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

fn default_quantity() -> u64 {
    1
}

/// Input for recording usage.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordUsage {
    pub tenant_id: Uuid,
    #[validate(length(min = 1))]
    pub event_type: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: u64,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RecordUsage {
    /// Validate and turn the input into an immutable event.
    pub fn into_event(self) -> Result<UsageEvent, service_core::error::AppError> {
        self.validate()?;

        Ok(UsageEvent {
            event_id: Uuid::new_v4(),
            tenant_id: self.tenant_id,
            event_type: UsageEventType::from_string(&self.event_type),
            quantity: self.quantity,
            metadata: self.metadata,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

/// One pricing band within a category's usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    /// First unit (zero-based) covered by this band.
    pub start: u64,
    /// Exclusive upper bound; `None` for the open-ended band.
    pub end: Option<u64>,
    pub quantity: u64,
    pub rate_per_unit: Decimal,
    pub charge: Decimal,
}

/// Computed usage for one event type in one billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub event_type: UsageEventType,
    pub total_quantity: u64,
    pub free_allowance: u64,
    pub billable_quantity: u64,
    pub rate_per_unit: Decimal,
    /// Full precision; rounding happens at presentation time.
    pub total_charge: Decimal,
    pub tier_breakdown: Vec<TierBand>,
}

/// Per-category usage totals in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    entries: Vec<(UsageEventType, u64)>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a category, creating it on first sight.
    pub fn add(&mut self, event_type: UsageEventType, quantity: u64) {
        match self.entries.iter_mut().find(|(t, _)| *t == event_type) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => self.entries.push((event_type, quantity)),
        }
    }

    pub fn get(&self, event_type: &UsageEventType) -> u64 {
        self.entries
            .iter()
            .find(|(t, _)| t == event_type)
            .map(|(_, q)| *q)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UsageEventType, u64)> {
        self.entries.iter().map(|(t, q)| (t, *q))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(UsageEventType, u64)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (UsageEventType, u64)>>(iter: I) -> Self {
        let mut totals = CategoryTotals::new();
        for (event_type, quantity) in iter {
            totals.add(event_type, quantity);
        }
        totals
    }
}
