//! Billing cycle persistence seam.
//!
//! The calculator holds no locks. Mutual exclusion of finalization lives
//! here: at most one non-failed cycle per (tenant, period), and status changes
//! are compare-and-set against the expected current status.

use crate::error::BillingError;
use crate::models::{BillingCycle, BillingCycleStatus, BillingPeriod, CycleUpdate};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;
use uuid::Uuid;

/// Billing cycle repository trait
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Store a new cycle. Fails with `Conflict` if the tenant already has a
    /// non-failed cycle for the same period.
    async fn insert(&self, cycle: BillingCycle) -> Result<BillingCycle, BillingError>;

    /// Find a cycle by ID
    async fn get(&self, cycle_id: Uuid) -> Result<Option<BillingCycle>, BillingError>;

    /// Find the non-failed cycle of a tenant for a period
    async fn find_open(
        &self,
        tenant_id: Uuid,
        period: &BillingPeriod,
    ) -> Result<Option<BillingCycle>, BillingError>;

    /// Apply `update` only if the stored status is still `expected`.
    async fn transition(
        &self,
        cycle_id: Uuid,
        expected: BillingCycleStatus,
        update: CycleUpdate,
    ) -> Result<BillingCycle, BillingError>;
}

/// Process-local repository backed by `DashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCycleRepository {
    cycles: DashMap<Uuid, BillingCycle>,
    open_index: DashMap<(Uuid, BillingPeriod), Uuid>,
}

impl InMemoryCycleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every cycle stored for a tenant, failed attempts included, oldest first.
    pub fn history(&self, tenant_id: Uuid) -> Vec<BillingCycle> {
        let mut cycles: Vec<BillingCycle> = self
            .cycles
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .map(|c| c.value().clone())
            .collect();
        cycles.sort_by_key(|c| (c.period.start, c.attempt));
        cycles
    }
}

#[async_trait]
impl CycleRepository for InMemoryCycleRepository {
    #[instrument(skip(self, cycle), fields(cycle_id = %cycle.cycle_id, tenant_id = %cycle.tenant_id))]
    async fn insert(&self, cycle: BillingCycle) -> Result<BillingCycle, BillingError> {
        match self.open_index.entry((cycle.tenant_id, cycle.period)) {
            Entry::Occupied(existing) => Err(BillingError::Conflict(format!(
                "tenant {} already has cycle {} for {}..{}",
                cycle.tenant_id,
                existing.get(),
                cycle.period.start,
                cycle.period.end
            ))),
            Entry::Vacant(slot) => {
                self.cycles.insert(cycle.cycle_id, cycle.clone());
                slot.insert(cycle.cycle_id);
                Ok(cycle)
            }
        }
    }

    async fn get(&self, cycle_id: Uuid) -> Result<Option<BillingCycle>, BillingError> {
        Ok(self.cycles.get(&cycle_id).map(|c| c.value().clone()))
    }

    async fn find_open(
        &self,
        tenant_id: Uuid,
        period: &BillingPeriod,
    ) -> Result<Option<BillingCycle>, BillingError> {
        let Some(cycle_id) = self.open_index.get(&(tenant_id, *period)).map(|id| *id) else {
            return Ok(None);
        };
        self.get(cycle_id).await
    }

    #[instrument(skip(self, update), fields(to = update.status.as_str()))]
    async fn transition(
        &self,
        cycle_id: Uuid,
        expected: BillingCycleStatus,
        update: CycleUpdate,
    ) -> Result<BillingCycle, BillingError> {
        if !expected.can_transition_to(update.status) {
            return Err(BillingError::invalid_transition(expected, update.status));
        }

        let updated = {
            let mut cycle = self
                .cycles
                .get_mut(&cycle_id)
                .ok_or(BillingError::CycleNotFound(cycle_id))?;

            if cycle.status != expected {
                return Err(BillingError::Conflict(format!(
                    "cycle {} is {}, expected {}",
                    cycle_id,
                    cycle.status.as_str(),
                    expected.as_str()
                )));
            }

            cycle.status = update.status;
            if update.result.is_some() {
                cycle.result = update.result;
            }
            if update.failure_reason.is_some() {
                cycle.failure_reason = update.failure_reason;
            }
            cycle.updated_utc = Utc::now();
            cycle.clone()
        };

        // A failed attempt frees the (tenant, period) slot for a retry.
        if updated.status == BillingCycleStatus::Failed {
            self.open_index
                .remove_if(&(updated.tenant_id, updated.period), |_, id| {
                    *id == updated.cycle_id
                });
        }

        tracing::debug!(
            cycle_id = %cycle_id,
            status = updated.status.as_str(),
            "Billing cycle transitioned"
        );
        Ok(updated)
    }
}
