//! Configuration module for billing-service.

use crate::error::BillingError;
use crate::services::RateTable;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    /// Rate table file (TOML/JSON/YAML). Built-in pricing when unset.
    pub rate_table_path: Option<String>,
    pub currency: String,
}

impl BillingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let currency = common.currency.clone();

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "billing-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rate_table_path: env::var("RATE_TABLE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            currency,
        })
    }

    /// Configured rate table, or the built-in one.
    pub fn rate_table(&self) -> Result<RateTable, BillingError> {
        match &self.rate_table_path {
            Some(path) => RateTable::from_file(path),
            None => Ok(RateTable::standard()),
        }
    }
}
