//! Services module for contract-service.

pub mod integrity;
pub mod metrics;

pub use integrity::{
    check_integrity, generate_contract_hash, serialize_contract_for_hashing, verify_contract_hash,
};
pub use metrics::{get_metrics, init_metrics, record_hash_generated, record_verification};
