//! service-core: Shared infrastructure for the contract and billing crates.
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
