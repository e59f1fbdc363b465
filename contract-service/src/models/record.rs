//! Stored contract record: content plus metadata.

use super::Contract;
use crate::services::integrity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::str::FromStr;
use uuid::Uuid;

/// Contract status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    PendingSignature,
    Signed,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::PendingSignature => "pending_signature",
            ContractStatus::Signed => "signed",
            ContractStatus::Cancelled => "cancelled",
        }
    }

    /// Content may only change while the contract is a draft.
    pub fn is_content_mutable(&self) -> bool {
        matches!(self, ContractStatus::Draft)
    }
}

impl FromStr for ContractStatus {
    type Err = AppError;

    /// Unknown values are rejected; they never fall back to an editable state.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContractStatus::Draft),
            "pending_signature" => Ok(ContractStatus::PendingSignature),
            "signed" => Ok(ContractStatus::Signed),
            "cancelled" => Ok(ContractStatus::Cancelled),
            other => Err(AppError::BadRequest(anyhow::anyhow!(
                "Unknown contract status '{}'",
                other
            ))),
        }
    }
}

/// Contract as held by the persistence layer.
///
/// None of the metadata fields take part in the content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    pub contract_id: Uuid,
    pub tenant_id: Uuid,
    pub status: ContractStatus,
    pub content: Contract,
    pub content_hash: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    pub signed_utc: Option<DateTime<Utc>>,
}

impl ContractRecord {
    /// Create a new draft. The content must already be validated.
    pub fn new_draft(tenant_id: Uuid, content: Contract) -> Self {
        let now = Utc::now();
        Self {
            contract_id: Uuid::new_v4(),
            tenant_id,
            status: ContractStatus::Draft,
            content,
            content_hash: None,
            created_utc: now,
            updated_utc: now,
            signed_utc: None,
        }
    }

    /// Replace the content of a draft.
    pub fn update_content(&mut self, content: Contract) -> Result<(), AppError> {
        if !self.status.is_content_mutable() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Contract {} is immutable once sealed (status: {})",
                self.contract_id,
                self.status.as_str()
            )));
        }

        self.content = content;
        self.updated_utc = Utc::now();
        Ok(())
    }

    /// Fingerprint the current content and send the contract out for signature.
    pub fn seal(&mut self) -> Result<&str, AppError> {
        if self.status != ContractStatus::Draft {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Only draft contracts can be sealed (status: {})",
                self.status.as_str()
            )));
        }

        let hash = integrity::generate_contract_hash(&self.content);
        tracing::info!(
            contract_id = %self.contract_id,
            tenant_id = %self.tenant_id,
            content_hash = %hash,
            "Contract sealed"
        );

        self.status = ContractStatus::PendingSignature;
        self.updated_utc = Utc::now();
        Ok(self.content_hash.insert(hash).as_str())
    }

    /// Record the signature event. The sealed hash must still match.
    pub fn mark_signed(&mut self, signed_at: DateTime<Utc>) -> Result<(), AppError> {
        if self.status != ContractStatus::PendingSignature {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Contract {} is not awaiting signature (status: {})",
                self.contract_id,
                self.status.as_str()
            )));
        }

        self.check_integrity()?;

        self.status = ContractStatus::Signed;
        self.signed_utc = Some(signed_at);
        self.updated_utc = Utc::now();
        Ok(())
    }

    /// Detect tampering of the content since it was sealed.
    pub fn check_integrity(&self) -> Result<(), AppError> {
        integrity::check_integrity(self.contract_id, &self.content, self.content_hash.as_deref())
    }
}
