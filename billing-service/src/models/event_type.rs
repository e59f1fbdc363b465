//! Usage event type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Countable platform consumption category.
///
/// Tags outside the known set are kept verbatim in [`UsageEventType::Other`]:
/// they are tracked like any other category and billed at zero until a rate
/// is configured for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsageEventType {
    ApiCall,
    WhatsappMessageSent,
    WhatsappMessageReceived,
    EmailSent,
    SmsSent,
    ContractGenerated,
    InvoiceCreated,
    LeadCreated,
    StorageUsed,
    UserSession,
    ReportGenerated,
    WebhookDelivered,
    Other(String),
}

impl UsageEventType {
    /// The closed set of tags the platform emits today.
    pub const KNOWN: [UsageEventType; 12] = [
        UsageEventType::ApiCall,
        UsageEventType::WhatsappMessageSent,
        UsageEventType::WhatsappMessageReceived,
        UsageEventType::EmailSent,
        UsageEventType::SmsSent,
        UsageEventType::ContractGenerated,
        UsageEventType::InvoiceCreated,
        UsageEventType::LeadCreated,
        UsageEventType::StorageUsed,
        UsageEventType::UserSession,
        UsageEventType::ReportGenerated,
        UsageEventType::WebhookDelivered,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            UsageEventType::Other(tag) => tag,
            known => known.metric_label(),
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "api_call" => UsageEventType::ApiCall,
            "whatsapp_message_sent" => UsageEventType::WhatsappMessageSent,
            "whatsapp_message_received" => UsageEventType::WhatsappMessageReceived,
            "email_sent" => UsageEventType::EmailSent,
            "sms_sent" => UsageEventType::SmsSent,
            "contract_generated" => UsageEventType::ContractGenerated,
            "invoice_created" => UsageEventType::InvoiceCreated,
            "lead_created" => UsageEventType::LeadCreated,
            "storage_used" => UsageEventType::StorageUsed,
            "user_session" => UsageEventType::UserSession,
            "report_generated" => UsageEventType::ReportGenerated,
            "webhook_delivered" => UsageEventType::WebhookDelivered,
            other => UsageEventType::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, UsageEventType::Other(_))
    }

    /// Bounded label for metrics; unknown tags collapse into `other`.
    pub fn metric_label(&self) -> &'static str {
        match self {
            UsageEventType::ApiCall => "api_call",
            UsageEventType::WhatsappMessageSent => "whatsapp_message_sent",
            UsageEventType::WhatsappMessageReceived => "whatsapp_message_received",
            UsageEventType::EmailSent => "email_sent",
            UsageEventType::SmsSent => "sms_sent",
            UsageEventType::ContractGenerated => "contract_generated",
            UsageEventType::InvoiceCreated => "invoice_created",
            UsageEventType::LeadCreated => "lead_created",
            UsageEventType::StorageUsed => "storage_used",
            UsageEventType::UserSession => "user_session",
            UsageEventType::ReportGenerated => "report_generated",
            UsageEventType::WebhookDelivered => "webhook_delivered",
            UsageEventType::Other(_) => "other",
        }
    }
}

impl From<String> for UsageEventType {
    fn from(s: String) -> Self {
        UsageEventType::from_string(&s)
    }
}

impl From<UsageEventType> for String {
    fn from(event_type: UsageEventType) -> Self {
        event_type.as_str().to_string()
    }
}

impl fmt::Display for UsageEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip() {
        for event_type in UsageEventType::KNOWN {
            assert!(event_type.is_known());
            assert_eq!(UsageEventType::from_string(event_type.as_str()), event_type);
            assert_eq!(event_type.metric_label(), event_type.as_str());
        }
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let event_type = UsageEventType::from_string("some_future_metric");
        assert_eq!(
            event_type,
            UsageEventType::Other("some_future_metric".to_string())
        );
        assert_eq!(event_type.as_str(), "some_future_metric");
        assert_eq!(event_type.metric_label(), "other");
        assert!(!event_type.is_known());
    }

    #[test]
    fn test_serde_uses_tag_strings() {
        let json = serde_json::to_string(&UsageEventType::WhatsappMessageSent).unwrap();
        assert_eq!(json, "\"whatsapp_message_sent\"");

        let parsed: UsageEventType = serde_json::from_str("\"lead_created\"").unwrap();
        assert_eq!(parsed, UsageEventType::LeadCreated);

        let parsed: UsageEventType = serde_json::from_str("\"new_thing\"").unwrap();
        assert_eq!(parsed, UsageEventType::Other("new_thing".to_string()));
    }
}
