use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommodityId(pub String);

impl fmt::Display for CommodityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of one commodity's inventory at one location.
///
/// Months of stock is never stored; it is derived from `quantity_on_hand` and
/// `average_monthly_consumption` each time it is read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockPosition {
    pub location_id: LocationId,
    pub location_name: String,
    pub district_id: String,
    pub district_name: String,
    pub region_id: String,
    pub region_name: String,
    pub commodity_id: CommodityId,
    pub commodity_name: String,
    pub quantity_on_hand: f64,
    pub average_monthly_consumption: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl StockPosition {
    /// Coverage in months, or `None` when consumption is zero, negative or not finite.
    pub fn months_of_stock(&self) -> Option<f64> {
        let consumption = self.average_monthly_consumption;
        if !consumption.is_finite() || consumption <= 0.0 || !self.quantity_on_hand.is_finite() {
            return None;
        }

        Some(self.quantity_on_hand / consumption)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.location_id.0.trim().is_empty() {
            return Err("location id must not be empty".to_string());
        }
        if self.commodity_id.0.trim().is_empty() {
            return Err("commodity id must not be empty".to_string());
        }
        if !self.quantity_on_hand.is_finite() || self.quantity_on_hand < 0.0 {
            return Err(format!(
                "quantity on hand must be a non-negative number, got {}",
                self.quantity_on_hand
            ));
        }
        if !self.average_monthly_consumption.is_finite() || self.average_monthly_consumption < 0.0 {
            return Err(format!(
                "average monthly consumption must be a non-negative number, got {}",
                self.average_monthly_consumption
            ));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} is outside [-90, 90]", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} is outside [-180, 180]", self.longitude));
        }

        Ok(())
    }
}
