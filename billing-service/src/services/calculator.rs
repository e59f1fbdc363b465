//! Usage billing calculator.

use crate::error::BillingError;
use crate::models::{
    BillingPeriod, CategoryTotals, CycleChargeResult, SubscriptionPlan, TierBand, UsageEventType,
    UsageSummary,
};
use crate::services::metrics::record_usage_summary;
use crate::services::rates::RateTable;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Stateless pricing service. Cheap to clone; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct UsageCalculator {
    rates: Arc<RateTable>,
}

impl UsageCalculator {
    pub fn new(rates: Arc<RateTable>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Price one category: everything above the free allowance at the flat rate.
    ///
    /// Fails with `AmountOverflow` when the charge does not fit a `Decimal`.
    pub fn summarize_category(
        &self,
        event_type: &UsageEventType,
        total_quantity: u64,
        plan: SubscriptionPlan,
    ) -> Result<UsageSummary, BillingError> {
        let free_allowance = self.rates.free_allowance(event_type, plan);
        let rate_per_unit = self.rates.rate_per_unit(event_type, plan);

        let billable_quantity = total_quantity.saturating_sub(free_allowance);
        let total_charge = metered_charge(event_type, billable_quantity, rate_per_unit)?;

        if !event_type.is_known() {
            tracing::debug!(
                event_type = %event_type,
                total_quantity,
                "Unpriced event type tracked at zero rate"
            );
        }
        record_usage_summary(event_type.metric_label(), plan.as_str());

        Ok(UsageSummary {
            event_type: event_type.clone(),
            total_quantity,
            free_allowance,
            billable_quantity,
            rate_per_unit,
            total_charge,
            tier_breakdown: tier_breakdown(
                total_quantity,
                free_allowance,
                rate_per_unit,
                total_charge,
            ),
        })
    }

    /// Price a whole period: usage summaries plus the flat plan fee.
    ///
    /// Categories with zero usage produce no summary row.
    #[instrument(skip(self, totals))]
    pub fn compute_cycle_charges(
        &self,
        tenant_id: Uuid,
        period: &BillingPeriod,
        plan: SubscriptionPlan,
        totals: &CategoryTotals,
    ) -> Result<CycleChargeResult, BillingError> {
        period.validate()?;
        let subscription_charge = self.rates.plan_cost(plan)?;

        let summaries = totals
            .iter()
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(event_type, quantity)| self.summarize_category(event_type, quantity, plan))
            .collect::<Result<Vec<UsageSummary>, BillingError>>()?;

        let usage_total = summaries
            .iter()
            .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.total_charge))
            .ok_or_else(|| BillingError::AmountOverflow("usage total".to_string()))?;
        let grand_total = usage_total
            .checked_add(subscription_charge)
            .ok_or_else(|| BillingError::AmountOverflow("grand total".to_string()))?;

        tracing::debug!(
            categories = summaries.len(),
            usage_total = %usage_total,
            subscription_charge = %subscription_charge,
            grand_total = %grand_total,
            "Cycle charges computed"
        );

        Ok(CycleChargeResult {
            tenant_id,
            period: *period,
            plan,
            summaries,
            usage_total,
            subscription_charge,
            grand_total,
        })
    }
}

fn metered_charge(
    event_type: &UsageEventType,
    billable_quantity: u64,
    rate_per_unit: Decimal,
) -> Result<Decimal, BillingError> {
    Decimal::from(billable_quantity)
        .checked_mul(rate_per_unit)
        .ok_or_else(|| {
            BillingError::AmountOverflow(format!(
                "{} x {} for {}",
                billable_quantity, rate_per_unit, event_type
            ))
        })
}

/// Free band followed by a single open-ended metered band.
fn tier_breakdown(
    total_quantity: u64,
    free_allowance: u64,
    rate_per_unit: Decimal,
    metered_charge: Decimal,
) -> Vec<TierBand> {
    let mut bands = Vec::with_capacity(2);

    let free_quantity = total_quantity.min(free_allowance);
    if free_quantity > 0 {
        bands.push(TierBand {
            start: 0,
            end: Some(free_allowance),
            quantity: free_quantity,
            rate_per_unit: Decimal::ZERO,
            charge: Decimal::ZERO,
        });
    }

    let billable = total_quantity.saturating_sub(free_allowance);
    if billable > 0 {
        bands.push(TierBand {
            start: free_allowance,
            end: None,
            quantity: billable,
            rate_per_unit,
            charge: metered_charge,
        });
    }

    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_breakdown_under_allowance() {
        let bands = tier_breakdown(500, 1000, dec!(0.001), Decimal::ZERO);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].quantity, 500);
        assert_eq!(bands[0].charge, Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_over_allowance() {
        let bands = tier_breakdown(1500, 1000, dec!(0.001), dec!(0.5));
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[1].start, 1000);
        assert_eq!(bands[1].end, None);
        assert_eq!(bands[1].quantity, 500);
        assert_eq!(bands[1].charge, dec!(0.5));
    }

    #[test]
    fn test_breakdown_without_allowance() {
        let bands = tier_breakdown(42, 0, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].start, 0);
        assert_eq!(bands[0].quantity, 42);
    }

    #[test]
    fn test_breakdown_of_nothing() {
        assert!(tier_breakdown(0, 100, dec!(1), Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_extreme_rate_is_an_error_not_a_panic() {
        let rates = RateTable::new()
            .with_plan_cost(SubscriptionPlan::Starter, dec!(99.00))
            .with_rate(UsageEventType::ApiCall, SubscriptionPlan::Starter, 0, Decimal::MAX);
        let calculator = UsageCalculator::new(Arc::new(rates));

        let result = calculator.summarize_category(
            &UsageEventType::ApiCall,
            u64::MAX,
            SubscriptionPlan::Starter,
        );
        assert!(matches!(result, Err(BillingError::AmountOverflow(_))));
    }

    #[test]
    fn test_overflowing_usage_total_fails_the_cycle() {
        let rates = RateTable::new()
            .with_plan_cost(SubscriptionPlan::Starter, dec!(99.00))
            .with_rate(UsageEventType::ApiCall, SubscriptionPlan::Starter, 0, Decimal::MAX)
            .with_rate(UsageEventType::SmsSent, SubscriptionPlan::Starter, 0, Decimal::MAX);
        let calculator = UsageCalculator::new(Arc::new(rates));
        let totals: CategoryTotals =
            vec![(UsageEventType::ApiCall, 1), (UsageEventType::SmsSent, 1)]
                .into_iter()
                .collect();

        let result = calculator.compute_cycle_charges(
            Uuid::new_v4(),
            &BillingPeriod::monthly(2024, 6).unwrap(),
            SubscriptionPlan::Starter,
            &totals,
        );
        assert!(matches!(result, Err(BillingError::AmountOverflow(_))));
        assert!(result.unwrap_err().is_finalize_failure());
    }
}
