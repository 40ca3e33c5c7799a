use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vaxflow_core::domain::stock::{CommodityId, LocationId, StockPosition};
use vaxflow_core::domain::suggestion::SuggestionId;
use vaxflow_core::domain::transfer::{
    RedistributionOrder, RedistributionOrderId, TransferId, TransferRequest,
};
use vaxflow_core::errors::CollaboratorError;

pub mod memory;
pub mod redistribution_order;
pub mod stock_position;

pub use memory::{InMemoryRedistributionOrderRepository, InMemoryStockPositionRepository};
pub use redistribution_order::SqlRedistributionOrderRepository;
pub use stock_position::SqlStockPositionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid record: {0}")]
    Invalid(String),
}

impl From<RepositoryError> for CollaboratorError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Invalid(message) => Self::Rejected(message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Write side and listing of stock positions, beyond what the engine consumes.
#[async_trait]
pub trait StockPositionRepository: Send + Sync {
    async fn save(&self, position: StockPosition) -> Result<(), RepositoryError>;

    async fn list_for_commodity(
        &self,
        commodity_id: &CommodityId,
    ) -> Result<Vec<StockPosition>, RepositoryError>;
}

#[async_trait]
pub trait RedistributionOrderRepository: Send + Sync {
    async fn find_order(
        &self,
        id: &RedistributionOrderId,
    ) -> Result<Option<RedistributionOrder>, RepositoryError>;

    async fn list_orders_for_target(
        &self,
        target_location_id: &LocationId,
    ) -> Result<Vec<RedistributionOrder>, RepositoryError>;

    async fn list_transfers_for_suggestion(
        &self,
        suggestion_id: &SuggestionId,
    ) -> Result<Vec<RecordedTransfer>, RepositoryError>;
}

/// A forwarded transfer execution as the ordering system stored it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedTransfer {
    pub transfer_id: TransferId,
    pub request: TransferRequest,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn retain_surplus(
    positions: Vec<StockPosition>,
    commodity_id: &CommodityId,
    min_months_of_stock: f64,
) -> Vec<StockPosition> {
    positions
        .into_iter()
        .filter(|position| {
            &position.commodity_id == commodity_id
                && position.months_of_stock().is_some_and(|mos| mos > min_months_of_stock)
        })
        .collect()
}

pub(crate) fn quantity_to_sql(quantity: u64) -> Result<i64, RepositoryError> {
    i64::try_from(quantity)
        .map_err(|_| RepositoryError::Invalid(format!("quantity {quantity} is out of range")))
}

pub(crate) fn quantity_from_sql(quantity: i64) -> Result<u64, RepositoryError> {
    u64::try_from(quantity)
        .map_err(|_| RepositoryError::Decode(format!("negative quantity {quantity}")))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp `{value}`: {error}")))
}
