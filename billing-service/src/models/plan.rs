//! Subscription plan model.

use crate::error::BillingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier. Ordering follows the tier ladder:
/// starter < professional < enterprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Starter,
    Professional,
    Enterprise,
}

impl SubscriptionPlan {
    pub const ALL: [SubscriptionPlan; 3] = [
        SubscriptionPlan::Starter,
        SubscriptionPlan::Professional,
        SubscriptionPlan::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Starter => "starter",
            SubscriptionPlan::Professional => "professional",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }

    /// Next tier up, if any.
    pub fn next_tier(&self) -> Option<SubscriptionPlan> {
        match self {
            SubscriptionPlan::Starter => Some(SubscriptionPlan::Professional),
            SubscriptionPlan::Professional => Some(SubscriptionPlan::Enterprise),
            SubscriptionPlan::Enterprise => None,
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(SubscriptionPlan::Starter),
            "professional" => Ok(SubscriptionPlan::Professional),
            "enterprise" => Ok(SubscriptionPlan::Enterprise),
            other => Err(BillingError::UnknownPlan(other.to_string())),
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
