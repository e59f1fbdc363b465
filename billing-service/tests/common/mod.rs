//! Test helper module for billing-service integration tests.

#![allow(dead_code)]

use billing_service::models::{BillingPeriod, CategoryTotals, UsageEventType};
use billing_service::services::{
    init_metrics, CycleFinalizer, InMemoryCycleRepository, RateTable, UsageCalculator,
};
use std::sync::Arc;
use uuid::Uuid;

// Test constants for tenant context
pub const TEST_TENANT_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const OTHER_TENANT_ID: &str = "22222222-2222-2222-2222-222222222222";

pub fn tenant_id() -> Uuid {
    Uuid::parse_str(TEST_TENANT_ID).unwrap()
}

pub fn other_tenant_id() -> Uuid {
    Uuid::parse_str(OTHER_TENANT_ID).unwrap()
}

pub fn june_2024() -> BillingPeriod {
    BillingPeriod::monthly(2024, 6).unwrap()
}

/// Calculator over the built-in pricing.
pub fn calculator() -> UsageCalculator {
    init_metrics();
    UsageCalculator::new(Arc::new(RateTable::standard()))
}

/// `{api_call: 1200, whatsapp_message_sent: 120}`
pub fn starter_month_totals() -> CategoryTotals {
    vec![
        (UsageEventType::ApiCall, 1200),
        (UsageEventType::WhatsappMessageSent, 120),
    ]
    .into_iter()
    .collect()
}

/// Finalizer over a fresh in-memory store.
pub struct TestBilling {
    pub repository: Arc<InMemoryCycleRepository>,
    pub finalizer: CycleFinalizer<InMemoryCycleRepository>,
}

impl TestBilling {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryCycleRepository::new());
        let finalizer = CycleFinalizer::new(Arc::clone(&repository), calculator());
        Self {
            repository,
            finalizer,
        }
    }
}
