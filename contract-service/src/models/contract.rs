//! Contract content model.
//!
//! Only the fields that define the legal content of a contract live here.
//! Identifiers, status and timestamps belong to [`super::ContractRecord`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Payment method agreed in the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    Cash,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(PaymentMethod::Pix),
            "cash" => Ok(PaymentMethod::Cash),
            "credit" => Ok(PaymentMethod::Credit),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

/// Contracting party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Contractor {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub tax_id: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Installation site address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InstallationAddress {
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub number: String,
    pub complement: Option<String>,
    #[validate(length(min = 1))]
    pub neighborhood: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(custom(function = "validate_state_code"))]
    pub state: String,
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(custom(function = "validate_latitude"))]
    pub latitude: Decimal,
    #[validate(custom(function = "validate_longitude"))]
    pub longitude: Decimal,
}

/// Equipment line, listed in `sort_position` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EquipmentItem {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    /// Unit or manufacturer label.
    pub unit: String,
    pub sort_position: i32,
}

/// Service line; the list has no meaningful order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ServiceItem {
    #[validate(length(min = 1))]
    pub description: String,
    pub included: bool,
}

/// Content-relevant fields of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_sort_positions"))]
pub struct Contract {
    #[validate(nested)]
    pub contractor: Contractor,
    #[validate(nested)]
    pub address: InstallationAddress,
    #[validate(nested)]
    pub coordinates: Option<Coordinates>,
    /// Project capacity in kWp.
    #[validate(custom(function = "validate_positive"))]
    pub project_kwp: Decimal,
    pub installation_date: Option<DateTime<Utc>>,
    #[validate(nested)]
    pub equipment: Vec<EquipmentItem>,
    #[validate(nested)]
    pub services: Vec<ServiceItem>,
    #[validate(custom(function = "validate_money"))]
    pub contract_value: Decimal,
    pub payment_method: PaymentMethod,
}

impl Contract {
    /// Run boundary validation and hand back the contract if it passes.
    pub fn validated(self) -> Result<Self, service_core::error::AppError> {
        self.validate()?;
        Ok(self)
    }
}

fn validate_state_code(state: &str) -> Result<(), ValidationError> {
    if state.len() == 2 && state.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_state_code"))
    }
}

fn validate_latitude(value: &Decimal) -> Result<(), ValidationError> {
    if (Decimal::from(-90)..=Decimal::from(90)).contains(value) {
        Ok(())
    } else {
        Err(ValidationError::new("latitude_out_of_range"))
    }
}

fn validate_longitude(value: &Decimal) -> Result<(), ValidationError> {
    if (Decimal::from(-180)..=Decimal::from(180)).contains(value) {
        Ok(())
    } else {
        Err(ValidationError::new("longitude_out_of_range"))
    }
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(value)?;
    if value.normalize().scale() > 2 {
        return Err(ValidationError::new("too_many_decimal_places"));
    }
    Ok(())
}

fn validate_sort_positions(contract: &Contract) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(contract.equipment.len());
    for item in &contract.equipment {
        if !seen.insert(item.sort_position) {
            return Err(ValidationError::new("duplicate_sort_position"));
        }
    }
    Ok(())
}
