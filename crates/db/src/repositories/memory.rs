use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use vaxflow_core::domain::stock::{CommodityId, LocationId, StockPosition};
use vaxflow_core::domain::suggestion::SuggestionId;
use vaxflow_core::domain::transfer::{
    RedistributionOrder, RedistributionOrderId, TransferId, TransferReceipt, TransferRequest,
};
use vaxflow_core::errors::CollaboratorError;
use vaxflow_core::redistribution::distance::haversine_km;
use vaxflow_core::redistribution::ports::{RedistributionOrderSink, StockPositionProvider};

use super::{
    retain_surplus, RecordedTransfer, RedistributionOrderRepository, RepositoryError,
    StockPositionRepository,
};

type PositionKey = (String, String);

#[derive(Default)]
pub struct InMemoryStockPositionRepository {
    positions: RwLock<BTreeMap<PositionKey, StockPosition>>,
}

impl InMemoryStockPositionRepository {
    pub async fn with_positions(
        positions: impl IntoIterator<Item = StockPosition>,
    ) -> Result<Self, RepositoryError> {
        let repo = Self::default();
        for position in positions {
            repo.save(position).await?;
        }
        Ok(repo)
    }
}

fn position_key(location_id: &LocationId, commodity_id: &CommodityId) -> PositionKey {
    (location_id.0.clone(), commodity_id.0.clone())
}

#[async_trait]
impl StockPositionRepository for InMemoryStockPositionRepository {
    async fn save(&self, position: StockPosition) -> Result<(), RepositoryError> {
        position.validate().map_err(RepositoryError::Invalid)?;
        let mut positions = self.positions.write().await;
        positions.insert(position_key(&position.location_id, &position.commodity_id), position);
        Ok(())
    }

    async fn list_for_commodity(
        &self,
        commodity_id: &CommodityId,
    ) -> Result<Vec<StockPosition>, RepositoryError> {
        let positions = self.positions.read().await;
        Ok(positions.values().filter(|p| &p.commodity_id == commodity_id).cloned().collect())
    }
}

#[async_trait]
impl StockPositionProvider for InMemoryStockPositionRepository {
    async fn get_stock_position(
        &self,
        location_id: &LocationId,
        commodity_id: &CommodityId,
    ) -> Result<Option<StockPosition>, CollaboratorError> {
        let positions = self.positions.read().await;
        Ok(positions.get(&position_key(location_id, commodity_id)).cloned())
    }

    async fn find_nearby_positions(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError> {
        let positions = self.positions.read().await;
        Ok(positions
            .values()
            .filter(|p| haversine_km(latitude, longitude, p.latitude, p.longitude) <= radius_km)
            .cloned()
            .collect())
    }

    async fn filter_surplus(
        &self,
        positions: Vec<StockPosition>,
        commodity_id: &CommodityId,
        min_months_of_stock: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError> {
        Ok(retain_surplus(positions, commodity_id, min_months_of_stock))
    }
}

#[derive(Default)]
pub struct InMemoryRedistributionOrderRepository {
    orders: RwLock<HashMap<String, RedistributionOrder>>,
    transfers: RwLock<Vec<RecordedTransfer>>,
}

#[async_trait]
impl RedistributionOrderRepository for InMemoryRedistributionOrderRepository {
    async fn find_order(
        &self,
        id: &RedistributionOrderId,
    ) -> Result<Option<RedistributionOrder>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id.0).cloned())
    }

    async fn list_orders_for_target(
        &self,
        target_location_id: &LocationId,
    ) -> Result<Vec<RedistributionOrder>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<RedistributionOrder> = orders
            .values()
            .filter(|order| &order.target_location_id == target_location_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(matching)
    }

    async fn list_transfers_for_suggestion(
        &self,
        suggestion_id: &SuggestionId,
    ) -> Result<Vec<RecordedTransfer>, RepositoryError> {
        let transfers = self.transfers.read().await;
        Ok(transfers
            .iter()
            .filter(|transfer| &transfer.request.suggestion_id == suggestion_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RedistributionOrderSink for InMemoryRedistributionOrderRepository {
    async fn create_redistribution_order(
        &self,
        order: RedistributionOrder,
    ) -> Result<RedistributionOrderId, CollaboratorError> {
        if order.quantity == 0 {
            return Err(CollaboratorError::Rejected("order quantity must be positive".to_string()));
        }

        let mut orders = self.orders.write().await;
        if let Some(existing) =
            orders.values().find(|stored| stored.idempotency_key == order.idempotency_key)
        {
            return Ok(existing.id.clone());
        }

        let id = order.id.clone();
        orders.insert(id.0.clone(), order);
        Ok(id)
    }

    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, CollaboratorError> {
        if request.quantity == 0 {
            return Err(CollaboratorError::Rejected(
                "transfer quantity must be positive".to_string(),
            ));
        }

        let transfer_id = TransferId(format!("TRF-{}", Uuid::new_v4()));
        let receipt = TransferReceipt {
            transfer_id: transfer_id.clone(),
            estimated_completion_minutes: request.estimated_completion_minutes,
        };

        let mut transfers = self.transfers.write().await;
        transfers.push(RecordedTransfer { transfer_id, request, created_at: Utc::now() });
        Ok(receipt)
    }
}
