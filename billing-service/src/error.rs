//! Billing error type.

use crate::models::BillingCycleStatus;
use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BillingError {
    /// Plan name outside the known tiers. Billing never falls back to a default plan.
    #[error("Unknown subscription plan '{0}'")]
    UnknownPlan(String),

    #[error("No flat subscription cost configured for plan '{0}'")]
    MissingPlanCost(String),

    #[error("Invalid billing period: {0}")]
    InvalidPeriod(String),

    #[error("Billing cycle {0} not found")]
    CycleNotFound(Uuid),

    #[error("Billing cycle {cycle_id} is {status}, expected active")]
    CycleNotActive {
        cycle_id: Uuid,
        status: &'static str,
    },

    #[error("Invalid billing cycle transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Unknown billing cycle status '{0}'")]
    UnknownStatus(String),

    #[error("Charge amount out of range: {0}")]
    AmountOverflow(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate table error: {0}")]
    RateTable(String),
}

impl BillingError {
    pub(crate) fn invalid_transition(from: BillingCycleStatus, to: BillingCycleStatus) -> Self {
        BillingError::InvalidTransition {
            from: from.as_str(),
            to: to.as_str(),
        }
    }

    /// Whether this error aborts a cycle finalization (cycle moves to `failed`).
    pub fn is_finalize_failure(&self) -> bool {
        matches!(
            self,
            BillingError::UnknownPlan(_)
                | BillingError::MissingPlanCost(_)
                | BillingError::InvalidPeriod(_)
                | BillingError::AmountOverflow(_)
        )
    }
}

impl From<config::ConfigError> for BillingError {
    fn from(err: config::ConfigError) -> Self {
        BillingError::RateTable(err.to_string())
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::UnknownPlan(_)
            | BillingError::MissingPlanCost(_)
            | BillingError::InvalidPeriod(_)
            | BillingError::AmountOverflow(_) => {
                AppError::BillingProcessingFailed(anyhow::Error::new(err))
            }
            BillingError::UnknownStatus(_) => AppError::BadRequest(anyhow::Error::new(err)),
            BillingError::CycleNotFound(_) => AppError::NotFound(anyhow::Error::new(err)),
            BillingError::CycleNotActive { .. }
            | BillingError::InvalidTransition { .. }
            | BillingError::Conflict(_) => AppError::Conflict(anyhow::Error::new(err)),
            BillingError::RateTable(_) => AppError::ConfigError(anyhow::Error::new(err)),
        }
    }
}
