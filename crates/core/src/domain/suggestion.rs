use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::stock::{CommodityId, LocationId, StockPosition};

const ID_SEPARATOR: char = '|';

/// Deterministic identifier that encodes the fields a transfer needs.
///
/// Suggestions are never persisted, so the identifier itself must carry the
/// source, target, commodity and quantity for `execute_transfer` to forward.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionId(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestionRef {
    pub source_location_id: LocationId,
    pub target_location_id: LocationId,
    pub commodity_id: CommodityId,
    pub quantity: u64,
}

impl SuggestionId {
    pub fn encode(
        source: &LocationId,
        target: &LocationId,
        commodity: &CommodityId,
        quantity: u64,
    ) -> Option<Self> {
        let parts = [source.0.as_str(), target.0.as_str(), commodity.0.as_str()];
        if parts.iter().any(|part| part.trim().is_empty() || part.contains(ID_SEPARATOR)) {
            return None;
        }

        Some(Self(format!("{}{ID_SEPARATOR}{}{ID_SEPARATOR}{}{ID_SEPARATOR}{quantity}", parts[0], parts[1], parts[2])))
    }

    pub fn decode(&self) -> Option<SuggestionRef> {
        let parts: Vec<&str> = self.0.split(ID_SEPARATOR).collect();
        let [source, target, commodity, quantity] = parts.as_slice() else {
            return None;
        };
        if [source, target, commodity].iter().any(|part| part.trim().is_empty()) {
            return None;
        }
        if source == target {
            return None;
        }
        let quantity = quantity.parse::<u64>().ok().filter(|quantity| *quantity > 0)?;

        Some(SuggestionRef {
            source_location_id: LocationId((*source).to_string()),
            target_location_id: LocationId((*target).to_string()),
            commodity_id: CommodityId((*commodity).to_string()),
            quantity,
        })
    }
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Urgency tier of the target's shortage. Declaration order is severity order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Half-open bands: `[0, 0.5)` critical, `[0.5, 1)` high, `[1, 2)` medium, rest low.
    pub fn from_months_of_stock(months_of_stock: f64) -> Self {
        if months_of_stock < 0.5 {
            Self::Critical
        } else if months_of_stock < 1.0 {
            Self::High
        } else if months_of_stock < 2.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub id: LocationId,
    pub name: String,
    pub region_name: String,
    pub stock_level: f64,
    pub months_of_stock: f64,
}

impl LocationSnapshot {
    pub fn capture(position: &StockPosition, months_of_stock: f64) -> Self {
        Self {
            id: position.location_id.clone(),
            name: position.location_name.clone(),
            region_name: position.region_name.clone(),
            stock_level: position.quantity_on_hand,
            months_of_stock,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityRef {
    pub id: CommodityId,
    pub name: String,
}

/// One ranked, explainable redistribution proposal. Immutable once minted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferSuggestion {
    pub id: SuggestionId,
    pub source_location: LocationSnapshot,
    pub target_location: LocationSnapshot,
    pub commodity: CommodityRef,
    pub suggested_quantity: u64,
    pub distance_km: f64,
    pub estimated_travel_time_minutes: f64,
    pub confidence_score: f64,
    pub priority: Priority,
    pub risk_factors: Vec<String>,
    pub benefits: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
