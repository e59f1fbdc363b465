//! Process-level initialisation for hosts embedding contract-service.

use crate::config::ContractConfig;
use crate::services::init_metrics;
use service_core::error::AppError;
use service_core::observability::init_tracing;

/// Install tracing and register metrics.
///
/// A host that already installed its own subscriber keeps it; only the
/// metrics registration is mandatory.
pub fn init_observability(config: &ContractConfig) -> Result<(), AppError> {
    if let Err(e) = init_tracing(&config.service_name, &config.log_level) {
        tracing::debug!(error = %e, "Keeping existing tracing subscriber");
    }

    init_metrics();

    tracing::info!(
        service_name = %config.service_name,
        version = %config.service_version,
        environment = %config.common.environment,
        "Contract integrity engine ready"
    );
    Ok(())
}
