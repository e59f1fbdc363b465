//! Application assembly for hosts embedding billing-service.

use crate::config::BillingConfig;
use crate::services::{init_metrics, CycleFinalizer, CycleRepository, UsageCalculator};
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::sync::Arc;

/// Application container wiring configuration, pricing and persistence.
pub struct Application<R: CycleRepository> {
    config: BillingConfig,
    calculator: UsageCalculator,
    finalizer: CycleFinalizer<R>,
}

impl<R: CycleRepository> Application<R> {
    /// Build the application with the given configuration and cycle store.
    pub fn build(config: BillingConfig, repository: Arc<R>) -> Result<Self, AppError> {
        // Initialize metrics
        init_metrics();

        if let Err(e) = init_tracing(&config.service_name, &config.log_level) {
            tracing::debug!(error = %e, "Keeping existing tracing subscriber");
        }

        let rates = config.rate_table().map_err(|e| {
            tracing::error!(error = %e, "Failed to load rate table");
            AppError::from(e)
        })?;

        for warning in rates.tier_monotonicity_warnings() {
            tracing::warn!(warning = %warning, "Rate table tier ordering");
        }

        let calculator = UsageCalculator::new(Arc::new(rates));
        let finalizer = CycleFinalizer::new(repository, calculator.clone());

        tracing::info!(
            service_name = %config.service_name,
            version = %config.service_version,
            environment = %config.common.environment,
            currency = %config.currency,
            rate_table = config.rate_table_path.as_deref().unwrap_or("built-in"),
            "Billing service ready"
        );

        Ok(Self {
            config,
            calculator,
            finalizer,
        })
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn calculator(&self) -> &UsageCalculator {
        &self.calculator
    }

    pub fn finalizer(&self) -> &CycleFinalizer<R> {
        &self.finalizer
    }
}
