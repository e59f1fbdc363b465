//! Integrity engine integration tests for contract-service.

mod common;

use common::{minimal_contract, sample_contract};
use contract_service::models::{Contract, PaymentMethod, ServiceItem};
use contract_service::services::{
    generate_contract_hash, serialize_contract_for_hashing, verify_contract_hash,
};
use rust_decimal_macros::dec;

#[test]
fn test_hash_is_64_lowercase_hex() {
    let hash = generate_contract_hash(&sample_contract());
    assert_eq!(hash.len(), 64);
    assert!(hash
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn test_hash_is_deterministic() {
    let contract = sample_contract();
    assert_eq!(
        generate_contract_hash(&contract),
        generate_contract_hash(&contract)
    );
    assert_eq!(
        generate_contract_hash(&contract),
        generate_contract_hash(&contract.clone())
    );
}

#[test]
fn test_item_and_service_order_does_not_matter() {
    let contract = sample_contract();

    let mut shuffled = contract.clone();
    shuffled.equipment.reverse();
    shuffled.services.rotate_left(1);

    assert_eq!(
        generate_contract_hash(&contract),
        generate_contract_hash(&shuffled)
    );
}

#[test]
fn test_contract_value_change_changes_hash() {
    let contract = sample_contract();
    let mut changed = contract.clone();
    changed.contract_value = dec!(27500.01);

    assert_ne!(
        generate_contract_hash(&contract),
        generate_contract_hash(&changed)
    );
}

#[test]
fn test_equipment_quantity_change_changes_hash() {
    let contract = sample_contract();
    let mut changed = contract.clone();
    changed.equipment[0].quantity = 11;

    assert_ne!(
        generate_contract_hash(&contract),
        generate_contract_hash(&changed)
    );
}

#[test]
fn test_equal_numeric_values_hash_identically() {
    let contract = sample_contract();
    let mut rescaled = contract.clone();
    rescaled.contract_value = dec!(27500);
    rescaled.project_kwp = dec!(5.5000);

    assert_eq!(
        generate_contract_hash(&contract),
        generate_contract_hash(&rescaled)
    );
}

#[test]
fn test_single_field_mutations_change_hash() {
    let base = sample_contract();
    let base_hash = generate_contract_hash(&base);

    let mutations: &[(&str, fn(&mut Contract))] = &[
        ("contractor name", |c: &mut Contract| c.contractor.name.push('x')),
        ("tax id", |c: &mut Contract| c.contractor.tax_id.push('1')),
        ("email", |c: &mut Contract| c.contractor.email = None),
        ("phone", |c: &mut Contract| c.contractor.phone = Some("0".to_string())),
        ("postal code", |c: &mut Contract| c.address.postal_code.push('9')),
        ("street", |c: &mut Contract| c.address.street.push('s')),
        ("number", |c: &mut Contract| c.address.number = "43".to_string()),
        ("complement", |c: &mut Contract| c.address.complement = None),
        ("neighborhood", |c: &mut Contract| c.address.neighborhood.push('n')),
        ("city", |c: &mut Contract| c.address.city.push('c')),
        ("state", |c: &mut Contract| c.address.state = "RJ".to_string()),
        ("coordinates", |c: &mut Contract| c.coordinates = None),
        ("kwp", |c: &mut Contract| c.project_kwp = dec!(5.51)),
        ("installation date", |c: &mut Contract| c.installation_date = None),
        ("item name", |c: &mut Contract| c.equipment[1].name.push('!')),
        ("item unit", |c: &mut Contract| c.equipment[1].unit.push('!')),
        ("item order", |c: &mut Contract| c.equipment[0].sort_position = 10),
        ("item removed", |c: &mut Contract| {
            c.equipment.pop();
        }),
        ("service included", |c: &mut Contract| c.services[2].included = true),
        ("service description", |c: &mut Contract| c.services[0].description.push('.')),
        ("service added", |c: &mut Contract| {
            c.services.push(ServiceItem {
                description: "Monitoramento".to_string(),
                included: true,
            })
        }),
        ("payment method", |c: &mut Contract| c.payment_method = PaymentMethod::Credit),
    ];

    for (name, mutate) in mutations {
        let mut changed = base.clone();
        mutate(&mut changed);
        assert_ne!(
            base_hash,
            generate_contract_hash(&changed),
            "mutation '{}' did not change the hash",
            name
        );
    }
}

#[test]
fn test_missing_optionals_serialize_as_empty_values() {
    let canonical = serialize_contract_for_hashing(&minimal_contract());

    for key in [
        "address_complement:|",
        "contractor_email:|",
        "contractor_phone:|",
        "installation_date:|",
        "latitude:|",
        "longitude:|",
    ] {
        assert!(canonical.contains(key), "missing empty field {}", key);
    }
}

#[test]
fn test_canonical_layout() {
    let canonical = serialize_contract_for_hashing(&sample_contract());
    let tokens: Vec<&str> = canonical.split('|').collect();

    assert!(tokens[0].starts_with("address_city:"));
    assert!(canonical.contains("contract_value:27500|"));
    assert!(canonical.contains("installation_date:2024-03-01T12\\:00\\:00.000Z|"));
    assert!(canonical.contains("payment_method:pix|"));

    let first_item = tokens.iter().position(|t| t.starts_with("item:")).unwrap();
    let first_service = tokens
        .iter()
        .position(|t| t.starts_with("service:"))
        .unwrap();
    assert!(first_item < first_service);
    assert_eq!(tokens[first_item], "item:Módulo fotovoltaico 550W:10:Jinko");

    // Accent-insensitive: "Homologação" < "Limpeza" < "Projeto"
    assert!(tokens[first_service].starts_with("service:Homologação"));
    assert_eq!(tokens.last().copied(), Some("service:Projeto elétrico:true"));
}

#[test]
fn test_separator_injection_does_not_collide() {
    let mut a = sample_contract();
    a.services = vec![ServiceItem {
        description: "Limpeza|service:Extra".to_string(),
        included: true,
    }];

    let mut b = sample_contract();
    b.services = vec![
        ServiceItem {
            description: "Limpeza".to_string(),
            included: true,
        },
        ServiceItem {
            description: "Extra".to_string(),
            included: true,
        },
    ];

    assert_ne!(generate_contract_hash(&a), generate_contract_hash(&b));
}

#[test]
fn test_colon_injection_does_not_collide() {
    let mut a = sample_contract();
    a.equipment.truncate(1);
    a.equipment[0].name = "Painel:1".to_string();
    a.equipment[0].quantity = 2;
    a.equipment[0].unit = "x".to_string();

    let mut b = a.clone();
    b.equipment[0].name = "Painel".to_string();
    b.equipment[0].quantity = 1;
    b.equipment[0].unit = "2:x".to_string();

    assert_ne!(generate_contract_hash(&a), generate_contract_hash(&b));
}

#[test]
fn test_verify_round_trip() {
    let contract = sample_contract();
    let hash = generate_contract_hash(&contract);
    assert!(verify_contract_hash(&contract, &hash));
}

#[test]
fn test_verify_rejects_other_contract_hash() {
    let contract = sample_contract();
    let mut other = contract.clone();
    other.contract_value = dec!(27500.01);

    assert!(!verify_contract_hash(
        &contract,
        &generate_contract_hash(&other)
    ));
}

#[test]
fn test_verify_is_case_insensitive() {
    let contract = sample_contract();
    let upper = generate_contract_hash(&contract).to_uppercase();
    assert!(verify_contract_hash(&contract, &upper));
}

#[test]
fn test_verify_malformed_hash_is_false() {
    let contract = sample_contract();
    let hash = generate_contract_hash(&contract);

    assert!(!verify_contract_hash(&contract, ""));
    assert!(!verify_contract_hash(&contract, "not-a-hash"));
    assert!(!verify_contract_hash(&contract, &hash[..63]));
    assert!(!verify_contract_hash(&contract, &format!("{}0", hash)));
    assert!(!verify_contract_hash(&contract, &"z".repeat(64)));
}

#[test]
fn test_duplicate_service_descriptions_are_order_independent() {
    let mut contract = sample_contract();
    contract.services = vec![
        ServiceItem {
            description: "Limpeza".to_string(),
            included: true,
        },
        ServiceItem {
            description: "Limpeza".to_string(),
            included: false,
        },
    ];
    let contract = contract.validated().unwrap();

    let mut reversed = contract.clone();
    reversed.services.reverse();

    assert_eq!(
        generate_contract_hash(&contract),
        generate_contract_hash(&reversed)
    );
    assert_eq!(
        serialize_contract_for_hashing(&contract),
        serialize_contract_for_hashing(&reversed)
    );
}
