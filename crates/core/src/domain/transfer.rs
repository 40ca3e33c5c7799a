use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::stock::{CommodityId, LocationId};
use crate::domain::suggestion::{Priority, SuggestionId};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedistributionOrderId(pub String);

impl fmt::Display for RedistributionOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub String);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Dispatched,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "dispatched" => Some(Self::Dispatched),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Requisition handed to the external ordering system.
///
/// `idempotency_key` is a digest of the suggestion's identifying fields so the
/// ordering system can collapse repeated submissions of the same suggestion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedistributionOrder {
    pub id: RedistributionOrderId,
    pub suggestion_id: SuggestionId,
    pub idempotency_key: String,
    pub source_location_id: LocationId,
    pub target_location_id: LocationId,
    pub commodity_id: CommodityId,
    pub commodity_name: String,
    pub quantity: u64,
    pub priority: Priority,
    pub confidence_score: f64,
    pub distance_km: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub estimated_completion_minutes: Option<u32>,
}

/// What the core forwards to the ordering system when a suggestion is executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub suggestion_id: SuggestionId,
    pub source_location_id: LocationId,
    pub target_location_id: LocationId,
    pub commodity_id: CommodityId,
    pub quantity: u64,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub estimated_completion_minutes: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: TransferId,
    pub estimated_completion_minutes: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferExecution {
    pub success: bool,
    pub transfer_id: TransferId,
    pub estimated_completion_minutes: u32,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn order_status_parses_storage_encoding() {
        let cases = [
            OrderStatus::Pending,
            OrderStatus::Dispatched,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ];

        for status in cases {
            let decoded = OrderStatus::parse(status.as_str());
            assert_eq!(decoded, Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
