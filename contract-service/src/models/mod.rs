//! Domain models for contract-service.

mod contract;
mod record;

pub use contract::{
    Contract, Contractor, Coordinates, EquipmentItem, InstallationAddress, PaymentMethod,
    ServiceItem,
};
pub use record::{ContractRecord, ContractStatus};
