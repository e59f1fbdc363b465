//! Test helper module for contract-service integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use contract_service::models::{
    Contract, Contractor, Coordinates, EquipmentItem, InstallationAddress, PaymentMethod,
    ServiceItem,
};
use rust_decimal_macros::dec;

/// Residential solar installation used across the suite.
pub fn sample_contract() -> Contract {
    Contract {
        contractor: Contractor {
            name: "João Pereira".to_string(),
            tax_id: "987.654.321-00".to_string(),
            email: Some("joao@example.com".to_string()),
            phone: Some("+55 11 91234-5678".to_string()),
        },
        address: InstallationAddress {
            postal_code: "13560-000".to_string(),
            street: "Rua das Flores".to_string(),
            number: "42".to_string(),
            complement: Some("Casa 2".to_string()),
            neighborhood: "Centro".to_string(),
            city: "São Carlos".to_string(),
            state: "SP".to_string(),
        },
        coordinates: Some(Coordinates {
            latitude: dec!(-22.0174),
            longitude: dec!(-47.8909),
        }),
        project_kwp: dec!(5.50),
        installation_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        equipment: vec![
            EquipmentItem {
                name: "Módulo fotovoltaico 550W".to_string(),
                quantity: 10,
                unit: "Jinko".to_string(),
                sort_position: 1,
            },
            EquipmentItem {
                name: "Inversor 5kW".to_string(),
                quantity: 1,
                unit: "Fronius".to_string(),
                sort_position: 2,
            },
            EquipmentItem {
                name: "Estrutura de fixação".to_string(),
                quantity: 4,
                unit: "Romagnole".to_string(),
                sort_position: 3,
            },
        ],
        services: vec![
            ServiceItem {
                description: "Projeto elétrico".to_string(),
                included: true,
            },
            ServiceItem {
                description: "Homologação junto à concessionária".to_string(),
                included: true,
            },
            ServiceItem {
                description: "Limpeza anual".to_string(),
                included: false,
            },
        ],
        contract_value: dec!(27500.00),
        payment_method: PaymentMethod::Pix,
    }
}

/// Same content as [`sample_contract`] with no optional fields set.
pub fn minimal_contract() -> Contract {
    let mut contract = sample_contract();
    contract.contractor.email = None;
    contract.contractor.phone = None;
    contract.address.complement = None;
    contract.coordinates = None;
    contract.installation_date = None;
    contract
}
