//! Collaborator contracts consumed by the transfer suggestion engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::stock::{CommodityId, LocationId, StockPosition};
use crate::domain::transfer::{
    RedistributionOrder, RedistributionOrderId, TransferReceipt, TransferRequest,
};
use crate::errors::CollaboratorError;

/// Geospatial/database access to stock positions.
#[async_trait]
pub trait StockPositionProvider: Send + Sync {
    async fn get_stock_position(
        &self,
        location_id: &LocationId,
        commodity_id: &CommodityId,
    ) -> Result<Option<StockPosition>, CollaboratorError>;

    /// Positions within `radius_km` of the given point, any commodity.
    async fn find_nearby_positions(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError>;

    /// Keeps positions of `commodity_id` whose months of stock exceed `min_months_of_stock`.
    async fn filter_surplus(
        &self,
        positions: Vec<StockPosition>,
        commodity_id: &CommodityId,
        min_months_of_stock: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError>;
}

/// External ordering/requisition system.
#[async_trait]
pub trait RedistributionOrderSink: Send + Sync {
    async fn create_redistribution_order(
        &self,
        order: RedistributionOrder,
    ) -> Result<RedistributionOrderId, CollaboratorError>;

    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, CollaboratorError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
