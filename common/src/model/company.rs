use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Card quota applied when a subscription carries no usable limit.
pub const DEFAULT_CARDS_LIMIT: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Starter,
    Pro,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub plan: SubscriptionPlan,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cards_limit: u64,
    #[serde(default)]
    pub cards_used: u64,
    #[serde(default)]
    pub status: SubscriptionStatus,
}

impl Subscription {
    /// The quota to enforce: a zero/unset limit means [`DEFAULT_CARDS_LIMIT`].
    pub fn effective_limit(&self) -> u64 {
        if self.cards_limit == 0 {
            DEFAULT_CARDS_LIMIT
        } else {
            self.cards_limit
        }
    }

    pub fn quota_reached(&self) -> bool {
        self.cards_used >= self.effective_limit()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub admin_id: String,
    #[serde(default)]
    pub subscription: Subscription,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
