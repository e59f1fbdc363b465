//! Metrics exposure tests for billing-service.

mod common;

use billing_service::services::get_metrics;
use billing_service::services::metrics::{CYCLE_FINALIZATIONS_TOTAL, USAGE_SUMMARIES_TOTAL};
use common::{june_2024, starter_month_totals, tenant_id, TestBilling};

#[tokio::test]
async fn finalization_outcomes_are_counted() {
    let billing = TestBilling::new();

    let finalizations = CYCLE_FINALIZATIONS_TOTAL.get().unwrap();
    let summaries = USAGE_SUMMARIES_TOTAL.get().unwrap();
    let completed = finalizations
        .with_label_values(&["starter", "completed"])
        .get();
    let failed = finalizations.with_label_values(&["unknown", "failed"]).get();
    let api_calls = summaries.with_label_values(&["api_call", "starter"]).get();

    let ok = billing
        .finalizer
        .open_cycle(tenant_id(), june_2024(), "starter")
        .await
        .unwrap();
    billing
        .finalizer
        .finalize(ok.cycle_id, &starter_month_totals())
        .await
        .unwrap();

    let bad = billing
        .finalizer
        .open_cycle(common::other_tenant_id(), june_2024(), "gold")
        .await
        .unwrap();
    assert!(billing
        .finalizer
        .finalize(bad.cycle_id, &starter_month_totals())
        .await
        .is_err());

    assert_eq!(
        finalizations
            .with_label_values(&["starter", "completed"])
            .get(),
        completed + 1
    );
    assert_eq!(
        finalizations.with_label_values(&["unknown", "failed"]).get(),
        failed + 1
    );
    assert_eq!(
        summaries.with_label_values(&["api_call", "starter"]).get(),
        api_calls + 1
    );

    let text = get_metrics();
    assert!(text.contains("billing_cycle_finalizations_total"));
    assert!(text.contains("billing_charge_amount_total"));
    assert!(text.contains("billing_cycle_finalize_duration_seconds"));
}
