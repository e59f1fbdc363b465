//! Cross-crate workflow test library.
//!
//! Wires contract-service and billing-service together in-process the way a
//! host application would: contracts are validated, sealed and signed;
//! usage events are recorded, aggregated per period and billed.

use anyhow::{anyhow, Result};
use billing_service::config::BillingConfig;
use billing_service::models::{BillingCycle, BillingPeriod, CategoryTotals, RecordUsage, UsageEvent};
use billing_service::services::{aggregate_usage, InMemoryCycleRepository};
use billing_service::startup::Application;
use chrono::{DateTime, Utc};
use contract_service::models::{Contract, ContractRecord};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Billing configuration for tests: built-in pricing, no environment lookups.
pub fn test_billing_config() -> BillingConfig {
    let common = service_core::config::Config::default();
    BillingConfig {
        currency: common.currency.clone(),
        common,
        service_name: "billing-service-test".to_string(),
        service_version: "0.1.0".to_string(),
        log_level: "warn".to_string(),
        rate_table_path: None,
    }
}

/// Context for workflow tests.
///
/// Each test should create a new context with its own tenant for isolation.
pub struct WorkflowTestContext {
    /// Unique tenant ID for this test
    pub tenant_id: Uuid,
    pub billing: Application<InMemoryCycleRepository>,
    pub cycles: Arc<InMemoryCycleRepository>,
    usage: Vec<UsageEvent>,
}

impl WorkflowTestContext {
    pub fn new() -> Result<Self> {
        init_tracing();

        let cycles = Arc::new(InMemoryCycleRepository::new());
        let billing = Application::build(test_billing_config(), Arc::clone(&cycles))
            .map_err(|e| anyhow!("Failed to build billing application: {}", e))?;

        Ok(Self {
            tenant_id: Uuid::new_v4(),
            billing,
            cycles,
            usage: Vec::new(),
        })
    }

    /// Validate, seal and sign a contract for this tenant.
    pub fn sign_contract(
        &self,
        contract: Contract,
        signed_at: DateTime<Utc>,
    ) -> Result<ContractRecord> {
        let content = contract.validated()?;
        let mut record = ContractRecord::new_draft(self.tenant_id, content);
        record.seal()?;
        record.mark_signed(signed_at)?;

        tracing::debug!(contract_id = %record.contract_id, "Contract signed");
        Ok(record)
    }

    /// Record a usage event for this tenant through the validated boundary.
    pub fn record_usage(
        &mut self,
        event_type: &str,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> Result<UsageEvent> {
        self.record_usage_for(self.tenant_id, event_type, quantity, at)
    }

    /// Record usage for another tenant into the same event log.
    pub fn record_usage_for(
        &mut self,
        tenant_id: Uuid,
        event_type: &str,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> Result<UsageEvent> {
        let event = RecordUsage {
            tenant_id,
            event_type: event_type.to_string(),
            quantity,
            metadata: Some(serde_json::json!({ "source": "workflow-tests" })),
            timestamp: Some(at),
        }
        .into_event()?;

        self.usage.push(event.clone());
        Ok(event)
    }

    /// This tenant's usage totals for a period.
    pub fn usage_totals(&self, period: &BillingPeriod) -> CategoryTotals {
        aggregate_usage(self.tenant_id, period, &self.usage)
    }

    /// Open the tenant's cycle for `period` and finalize it from recorded usage.
    pub async fn close_period(&self, period: BillingPeriod, plan: &str) -> Result<BillingCycle> {
        let finalizer = self.billing.finalizer();
        let cycle = finalizer.open_cycle(self.tenant_id, period, plan).await?;
        let totals = self.usage_totals(&period);

        Ok(finalizer.finalize(cycle.cycle_id, &totals).await?)
    }
}
