//! Common test utilities for workflow tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use contract_service::models::{
    Contract, Contractor, EquipmentItem, InstallationAddress, PaymentMethod, ServiceItem,
};
use rust_decimal_macros::dec;
use workflow_tests::WorkflowTestContext;

/// Create a new workflow test context.
///
/// This is the main entry point for workflow tests.
pub fn setup() -> WorkflowTestContext {
    WorkflowTestContext::new().expect("Failed to create workflow test context")
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Small commercial rooftop installation.
pub fn rooftop_contract() -> Contract {
    Contract {
        contractor: Contractor {
            name: "Padaria Estrela Ltda".to_string(),
            tax_id: "12.345.678/0001-90".to_string(),
            email: Some("financeiro@padariaestrela.com.br".to_string()),
            phone: None,
        },
        address: InstallationAddress {
            postal_code: "30130-010".to_string(),
            street: "Avenida Afonso Pena".to_string(),
            number: "1500".to_string(),
            complement: None,
            neighborhood: "Centro".to_string(),
            city: "Belo Horizonte".to_string(),
            state: "MG".to_string(),
        },
        coordinates: None,
        project_kwp: dec!(12.1),
        installation_date: None,
        equipment: vec![
            EquipmentItem {
                name: "Módulo 550W".to_string(),
                quantity: 22,
                unit: "Canadian Solar".to_string(),
                sort_position: 1,
            },
            EquipmentItem {
                name: "Inversor 10kW".to_string(),
                quantity: 1,
                unit: "Growatt".to_string(),
                sort_position: 2,
            },
        ],
        services: vec![
            ServiceItem {
                description: "Instalação".to_string(),
                included: true,
            },
            ServiceItem {
                description: "Monitoramento remoto".to_string(),
                included: true,
            },
        ],
        contract_value: dec!(48900.00),
        payment_method: PaymentMethod::Credit,
    }
}
