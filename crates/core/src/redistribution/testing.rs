use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::distance::haversine_km;
use super::ports::{RedistributionOrderSink, StockPositionProvider};
use crate::domain::stock::{CommodityId, LocationId, StockPosition};
use crate::domain::transfer::{
    RedistributionOrder, RedistributionOrderId, TransferId, TransferReceipt, TransferRequest,
};
use crate::errors::CollaboratorError;

/// Fixed set of positions with call counters.
pub(crate) struct StaticPositions {
    positions: Vec<StockPosition>,
    fail_discovery: bool,
    nearby_calls: AtomicUsize,
    filter_calls: AtomicUsize,
}

impl StaticPositions {
    pub(crate) fn new(positions: Vec<StockPosition>) -> Self {
        Self {
            positions,
            fail_discovery: false,
            nearby_calls: AtomicUsize::new(0),
            filter_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_discovery() -> Self {
        Self::new(Vec::new()).with_failing_discovery()
    }

    pub(crate) fn with_failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub(crate) fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StockPositionProvider for StaticPositions {
    async fn get_stock_position(
        &self,
        location_id: &LocationId,
        commodity_id: &CommodityId,
    ) -> Result<Option<StockPosition>, CollaboratorError> {
        Ok(self
            .positions
            .iter()
            .find(|p| &p.location_id == location_id && &p.commodity_id == commodity_id)
            .cloned())
    }

    async fn find_nearby_positions(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_discovery {
            return Err(CollaboratorError::Unavailable("position index offline".to_string()));
        }

        Ok(self
            .positions
            .iter()
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
        self.filter_calls.fetch_add(1, Ordering::SeqCst);

        Ok(positions
            .into_iter()
            .filter(|p| {
                &p.commodity_id == commodity_id
                    && p.months_of_stock().is_some_and(|mos| mos > min_months_of_stock)
            })
            .collect())
    }
}

/// Order sink that records everything it receives.
#[derive(Default)]
pub(crate) struct RecordingOrderSink {
    pub(crate) orders: Mutex<Vec<RedistributionOrder>>,
    pub(crate) requests: Mutex<Vec<TransferRequest>>,
    pub(crate) receipt_minutes: Option<u32>,
    pub(crate) reject_with: Option<String>,
}

impl RecordingOrderSink {
    pub(crate) fn with_receipt_minutes(minutes: u32) -> Self {
        Self { receipt_minutes: Some(minutes), ..Self::default() }
    }

    pub(crate) fn rejecting(message: &str) -> Self {
        Self { reject_with: Some(message.to_string()), ..Self::default() }
    }

    pub(crate) fn requests(&self) -> Vec<TransferRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    pub(crate) fn orders(&self) -> Vec<RedistributionOrder> {
        self.orders.lock().map(|orders| orders.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RedistributionOrderSink for RecordingOrderSink {
    async fn create_redistribution_order(
        &self,
        order: RedistributionOrder,
    ) -> Result<RedistributionOrderId, CollaboratorError> {
        if let Some(message) = &self.reject_with {
            return Err(CollaboratorError::Rejected(message.clone()));
        }
        let id = order.id.clone();
        if let Ok(mut orders) = self.orders.lock() {
            orders.push(order);
        }
        Ok(id)
    }

    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, CollaboratorError> {
        if let Some(message) = &self.reject_with {
            return Err(CollaboratorError::Rejected(message.clone()));
        }
        let transfer_id = TransferId(format!("TRF-{}", request.suggestion_id));
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Ok(TransferReceipt { transfer_id, estimated_completion_minutes: self.receipt_minutes })
    }
}
