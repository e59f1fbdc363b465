//! Contract integrity engine.
//!
//! Canonical form: every scalar field as `key:value` in key order, then
//! `item:{name}:{quantity}:{unit}` tokens in sort-position order, then
//! `service:{description}:{included}` tokens in collation order, all joined
//! with `|`. Field values are escaped (`\`, `|` and `:` get a leading `\`)
//! so that distinct contracts never share a canonical string.

use crate::models::{Contract, EquipmentItem, ServiceItem};
use crate::services::metrics::{record_hash_generated, record_verification};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use subtle::ConstantTimeEq;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Reserved token separator.
pub const FIELD_SEPARATOR: char = '|';

const HASH_HEX_LEN: usize = 64;

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | FIELD_SEPARATOR | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Decimal rendered without trailing zeros, so `27500.00` and `27500` agree.
fn canonical_decimal(value: &Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}

fn canonical_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accent- and case-insensitive sort key ("Água" sorts next to "agua").
fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn compare_descriptions(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Total order over services: description, then the included flag.
fn compare_services(a: &ServiceItem, b: &ServiceItem) -> Ordering {
    compare_descriptions(&a.description, &b.description).then_with(|| a.included.cmp(&b.included))
}

fn scalar_fields(contract: &Contract) -> BTreeMap<&'static str, String> {
    let contractor = &contract.contractor;
    let address = &contract.address;
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut fields = BTreeMap::new();
    fields.insert("contractor_name", contractor.name.clone());
    fields.insert("contractor_tax_id", contractor.tax_id.clone());
    fields.insert("contractor_email", optional(&contractor.email));
    fields.insert("contractor_phone", optional(&contractor.phone));
    fields.insert("address_postal_code", address.postal_code.clone());
    fields.insert("address_street", address.street.clone());
    fields.insert("address_number", address.number.clone());
    fields.insert("address_complement", optional(&address.complement));
    fields.insert("address_neighborhood", address.neighborhood.clone());
    fields.insert("address_city", address.city.clone());
    fields.insert("address_state", address.state.clone());
    fields.insert(
        "latitude",
        contract
            .coordinates
            .map(|c| canonical_decimal(&c.latitude))
            .unwrap_or_default(),
    );
    fields.insert(
        "longitude",
        contract
            .coordinates
            .map(|c| canonical_decimal(&c.longitude))
            .unwrap_or_default(),
    );
    fields.insert("project_kwp", canonical_decimal(&contract.project_kwp));
    fields.insert(
        "installation_date",
        contract
            .installation_date
            .as_ref()
            .map(canonical_timestamp)
            .unwrap_or_default(),
    );
    fields.insert("contract_value", canonical_decimal(&contract.contract_value));
    fields.insert(
        "payment_method",
        contract.payment_method.as_str().to_string(),
    );
    fields
}

fn item_token(item: &EquipmentItem) -> String {
    format!(
        "item:{}:{}:{}",
        escape(&item.name),
        item.quantity,
        escape(&item.unit)
    )
}

fn service_token(service: &ServiceItem) -> String {
    format!(
        "service:{}:{}",
        escape(&service.description),
        service.included
    )
}

/// Deterministic canonical string of the content-relevant fields.
pub fn serialize_contract_for_hashing(contract: &Contract) -> String {
    let mut tokens: Vec<String> = scalar_fields(contract)
        .into_iter()
        .map(|(key, value)| format!("{}:{}", key, escape(&value)))
        .collect();

    // Positions are unique after validation; the token breaks ties otherwise.
    let mut items: Vec<(i32, String)> = contract
        .equipment
        .iter()
        .map(|item| (item.sort_position, item_token(item)))
        .collect();
    items.sort();
    tokens.extend(items.into_iter().map(|(_, token)| token));

    let mut services: Vec<&ServiceItem> = contract.services.iter().collect();
    services.sort_by(|a, b| compare_services(a, b));
    tokens.extend(services.into_iter().map(service_token));

    tokens.join(&FIELD_SEPARATOR.to_string())
}

/// SHA-256 of the canonical string, as 64 lowercase hex characters.
pub fn generate_contract_hash(contract: &Contract) -> String {
    let canonical = serialize_contract_for_hashing(contract);
    let hash = hex::encode(Sha256::digest(canonical.as_bytes()));
    record_hash_generated();
    hash
}

/// Check a stored hash against the current content.
///
/// Comparison is case-insensitive. Anything that is not 64 hex characters
/// simply does not match.
pub fn verify_contract_hash(contract: &Contract, stored_hash: &str) -> bool {
    if stored_hash.len() != HASH_HEX_LEN || !stored_hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        record_verification("malformed");
        return false;
    }

    let expected = generate_contract_hash(contract);
    let stored = stored_hash.to_ascii_lowercase();
    let matches: bool = expected.as_bytes().ct_eq(stored.as_bytes()).into();

    record_verification(if matches { "match" } else { "mismatch" });
    matches
}

/// Verification as a `Result`, for callers that surface the failure.
///
/// The error never carries the canonical string, so it cannot reveal which
/// field changed.
pub fn check_integrity(
    contract_id: Uuid,
    contract: &Contract,
    stored_hash: Option<&str>,
) -> Result<(), AppError> {
    let Some(stored_hash) = stored_hash else {
        tracing::warn!(contract_id = %contract_id, "Integrity check without a stored hash");
        return Err(AppError::IntegrityCheckFailed);
    };

    if verify_contract_hash(contract, stored_hash) {
        tracing::debug!(contract_id = %contract_id, "Integrity check passed");
        Ok(())
    } else {
        tracing::warn!(contract_id = %contract_id, "Integrity check failed");
        Err(AppError::IntegrityCheckFailed)
    }
}
