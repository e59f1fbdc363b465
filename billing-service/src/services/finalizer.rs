//! Billing cycle finalization.
//!
//! Drives a cycle through `active -> processing -> completed | failed` on top
//! of a [`CycleRepository`]. Pricing itself is delegated to the stateless
//! [`UsageCalculator`].

use crate::error::BillingError;
use crate::models::{
    BillingCycle, BillingCycleStatus, BillingPeriod, CategoryTotals, CycleChargeResult,
    CycleUpdate, SubscriptionPlan,
};
use crate::services::calculator::UsageCalculator;
use crate::services::metrics::{
    record_charge_amount, record_cycle_finalization, record_finalize_duration,
};
use crate::services::repository::CycleRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

pub struct CycleFinalizer<R: CycleRepository> {
    repository: Arc<R>,
    calculator: UsageCalculator,
}

impl<R: CycleRepository> Clone for CycleFinalizer<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            calculator: self.calculator.clone(),
        }
    }
}

impl<R: CycleRepository> CycleFinalizer<R> {
    pub fn new(repository: Arc<R>, calculator: UsageCalculator) -> Self {
        Self {
            repository,
            calculator,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn calculator(&self) -> &UsageCalculator {
        &self.calculator
    }

    /// Open the cycle of a tenant for a period.
    ///
    /// The plan is stored as given and only parsed at finalization, so an
    /// unknown plan fails the cycle instead of being rejected here.
    #[instrument(skip(self))]
    pub async fn open_cycle(
        &self,
        tenant_id: Uuid,
        period: BillingPeriod,
        plan: &str,
    ) -> Result<BillingCycle, BillingError> {
        let cycle = self
            .repository
            .insert(BillingCycle::open(tenant_id, period, plan))
            .await?;

        tracing::info!(cycle_id = %cycle.cycle_id, "Billing cycle opened");
        Ok(cycle)
    }

    /// Price an active cycle without changing it.
    pub async fn estimate(
        &self,
        cycle_id: Uuid,
        totals: &CategoryTotals,
    ) -> Result<CycleChargeResult, BillingError> {
        let cycle = self.load(cycle_id).await?;
        if cycle.status != BillingCycleStatus::Active {
            return Err(BillingError::CycleNotActive {
                cycle_id,
                status: cycle.status.as_str(),
            });
        }

        self.compute(&cycle, totals)
    }

    /// Finalize an active cycle.
    ///
    /// Only one caller wins the `active -> processing` transition; concurrent
    /// or repeated calls get `Conflict`. A pricing error moves the cycle to
    /// `failed` and is returned to the caller.
    #[instrument(skip(self, totals))]
    pub async fn finalize(
        &self,
        cycle_id: Uuid,
        totals: &CategoryTotals,
    ) -> Result<BillingCycle, BillingError> {
        let started = Instant::now();
        let cycle = self
            .repository
            .transition(
                cycle_id,
                BillingCycleStatus::Active,
                CycleUpdate::processing(),
            )
            .await?;
        let plan_label = metric_plan_label(&cycle.plan);

        let finalized = match self.compute(&cycle, totals) {
            Ok(result) => {
                record_charge_amount(plan_label, "usage", result.usage_total);
                record_charge_amount(plan_label, "subscription", result.subscription_charge);

                let completed = self
                    .repository
                    .transition(
                        cycle_id,
                        BillingCycleStatus::Processing,
                        CycleUpdate::completed(result),
                    )
                    .await?;
                tracing::info!(
                    cycle_id = %cycle_id,
                    attempt = completed.attempt,
                    "Billing cycle completed"
                );
                Ok(completed)
            }
            Err(e) => {
                tracing::error!(
                    cycle_id = %cycle_id,
                    plan = %cycle.plan,
                    error = %e,
                    "Billing cycle finalization failed"
                );
                self.repository
                    .transition(
                        cycle_id,
                        BillingCycleStatus::Processing,
                        CycleUpdate::failed(e.to_string()),
                    )
                    .await?;
                Err(e)
            }
        };

        let status = if finalized.is_ok() {
            BillingCycleStatus::Completed
        } else {
            BillingCycleStatus::Failed
        };
        record_cycle_finalization(plan_label, status.as_str());
        record_finalize_duration(plan_label, started.elapsed().as_secs_f64());

        finalized
    }

    /// Start a new attempt for a failed cycle and finalize it.
    ///
    /// The failed record is left untouched; the new cycle carries
    /// `attempt + 1` and points back at it.
    #[instrument(skip(self, totals))]
    pub async fn retry(
        &self,
        failed_cycle_id: Uuid,
        plan: &str,
        totals: &CategoryTotals,
    ) -> Result<BillingCycle, BillingError> {
        let failed = self.load(failed_cycle_id).await?;
        if failed.status != BillingCycleStatus::Failed {
            return Err(BillingError::Conflict(format!(
                "cycle {} is {}, only failed cycles can be retried",
                failed_cycle_id,
                failed.status.as_str()
            )));
        }

        let cycle = self
            .repository
            .insert(BillingCycle::retry_of(&failed, plan))
            .await?;
        tracing::info!(
            cycle_id = %cycle.cycle_id,
            previous_cycle_id = %failed_cycle_id,
            attempt = cycle.attempt,
            "Retrying billing cycle"
        );

        self.finalize(cycle.cycle_id, totals).await
    }

    async fn load(&self, cycle_id: Uuid) -> Result<BillingCycle, BillingError> {
        self.repository
            .get(cycle_id)
            .await?
            .ok_or(BillingError::CycleNotFound(cycle_id))
    }

    fn compute(
        &self,
        cycle: &BillingCycle,
        totals: &CategoryTotals,
    ) -> Result<CycleChargeResult, BillingError> {
        let plan: SubscriptionPlan = cycle.plan.parse()?;
        self.calculator
            .compute_cycle_charges(cycle.tenant_id, &cycle.period, plan, totals)
    }
}

/// Bounded label set: stored plan strings are caller input.
fn metric_plan_label(plan: &str) -> &'static str {
    plan.parse::<SubscriptionPlan>()
        .map(|p| p.as_str())
        .unwrap_or("unknown")
}
