//! Usage event aggregation.

use crate::models::{BillingPeriod, CategoryTotals, UsageEvent};
use uuid::Uuid;

/// Sum one tenant's usage inside `period`, per event type.
///
/// Events for other tenants or outside `[start, end)` are skipped.
pub fn aggregate_usage<'a, I>(tenant_id: Uuid, period: &BillingPeriod, events: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a UsageEvent>,
{
    let mut totals = CategoryTotals::new();
    let mut skipped = 0usize;

    for event in events {
        if event.tenant_id != tenant_id || !period.contains(event.timestamp) {
            skipped += 1;
            continue;
        }
        totals.add(event.event_type.clone(), event.quantity);
    }

    tracing::debug!(
        tenant_id = %tenant_id,
        categories = totals.len(),
        skipped,
        "Usage aggregated"
    );
    totals
}
