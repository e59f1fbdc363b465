//! Billing Service - usage-based charges and billing cycle finalization.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod startup;
