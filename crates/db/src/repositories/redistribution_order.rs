use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use vaxflow_core::domain::stock::{CommodityId, LocationId};
use vaxflow_core::domain::suggestion::{Priority, SuggestionId};
use vaxflow_core::domain::transfer::{
    OrderStatus, RedistributionOrder, RedistributionOrderId, TransferId, TransferReceipt,
    TransferRequest,
};
use vaxflow_core::errors::CollaboratorError;
use vaxflow_core::redistribution::ports::RedistributionOrderSink;

use super::{
    parse_timestamp, quantity_from_sql, quantity_to_sql, RecordedTransfer,
    RedistributionOrderRepository, RepositoryError,
};
use crate::DbPool;

const ORDER_COLUMNS: &str = "SELECT id, suggestion_id, idempotency_key, source_location_id,
        target_location_id, commodity_id, commodity_name, quantity, priority,
        confidence_score, distance_km, status, created_at
 FROM redistribution_order";

/// SQLite-backed stand-in for the external ordering system.
pub struct SqlRedistributionOrderRepository {
    pool: DbPool,
}

impl SqlRedistributionOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts the order unless its idempotency key is already known, and
    /// returns the id of whichever row holds the key.
    pub async fn record_order(
        &self,
        order: &RedistributionOrder,
    ) -> Result<RedistributionOrderId, RepositoryError> {
        let quantity = quantity_to_sql(order.quantity)?;
        if quantity == 0 {
            return Err(RepositoryError::Invalid("order quantity must be positive".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO redistribution_order (id, suggestion_id, idempotency_key,
                                               source_location_id, target_location_id,
                                               commodity_id, commodity_name, quantity, priority,
                                               confidence_score, distance_km, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(idempotency_key) DO NOTHING",
        )
        .bind(&order.id.0)
        .bind(&order.suggestion_id.0)
        .bind(&order.idempotency_key)
        .bind(&order.source_location_id.0)
        .bind(&order.target_location_id.0)
        .bind(&order.commodity_id.0)
        .bind(&order.commodity_name)
        .bind(quantity)
        .bind(order.priority.as_str())
        .bind(order.confidence_score)
        .bind(order.distance_km)
        .bind(order.status.as_str())
        .bind(order.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let stored_id: String =
            sqlx::query_scalar("SELECT id FROM redistribution_order WHERE idempotency_key = ?")
                .bind(&order.idempotency_key)
                .fetch_one(&mut *tx)
                .await?;
        tx.commit().await?;

        info!(
            event_name = "db.redistribution_order.recorded",
            order_id = %stored_id,
            suggestion_id = %order.suggestion_id,
            deduplicated = inserted == 0,
            "redistribution order recorded"
        );

        Ok(RedistributionOrderId(stored_id))
    }

    pub async fn record_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, RepositoryError> {
        let quantity = quantity_to_sql(request.quantity)?;
        if quantity == 0 {
            return Err(RepositoryError::Invalid("transfer quantity must be positive".to_string()));
        }

        let transfer_id = TransferId(format!("TRF-{}", Uuid::new_v4()));
        sqlx::query(
            "INSERT INTO transfer_execution (id, suggestion_id, source_location_id,
                                             target_location_id, commodity_id, quantity,
                                             reason, notes, estimated_completion_minutes,
                                             created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&transfer_id.0)
        .bind(&request.suggestion_id.0)
        .bind(&request.source_location_id.0)
        .bind(&request.target_location_id.0)
        .bind(&request.commodity_id.0)
        .bind(quantity)
        .bind(&request.reason)
        .bind(&request.notes)
        .bind(request.estimated_completion_minutes)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(
            event_name = "db.transfer_execution.recorded",
            transfer_id = %transfer_id,
            suggestion_id = %request.suggestion_id,
            "transfer execution recorded"
        );

        Ok(TransferReceipt {
            transfer_id,
            estimated_completion_minutes: request.estimated_completion_minutes,
        })
    }
}

fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<RedistributionOrder, RepositoryError> {
    let decode = |error: sqlx::Error| RepositoryError::Decode(error.to_string());

    let priority: String = row.try_get("priority").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(RedistributionOrder {
        id: RedistributionOrderId(row.try_get("id").map_err(decode)?),
        suggestion_id: SuggestionId(row.try_get("suggestion_id").map_err(decode)?),
        idempotency_key: row.try_get("idempotency_key").map_err(decode)?,
        source_location_id: LocationId(row.try_get("source_location_id").map_err(decode)?),
        target_location_id: LocationId(row.try_get("target_location_id").map_err(decode)?),
        commodity_id: CommodityId(row.try_get("commodity_id").map_err(decode)?),
        commodity_name: row.try_get("commodity_name").map_err(decode)?,
        quantity: quantity_from_sql(quantity)?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown priority `{priority}`")))?,
        confidence_score: row.try_get("confidence_score").map_err(decode)?,
        distance_km: row.try_get("distance_km").map_err(decode)?,
        status: OrderStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown order status `{status}`")))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_transfer(row: &sqlx::sqlite::SqliteRow) -> Result<RecordedTransfer, RepositoryError> {
    let decode = |error: sqlx::Error| RepositoryError::Decode(error.to_string());

    let quantity: i64 = row.try_get("quantity").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(RecordedTransfer {
        transfer_id: TransferId(row.try_get("id").map_err(decode)?),
        request: TransferRequest {
            suggestion_id: SuggestionId(row.try_get("suggestion_id").map_err(decode)?),
            source_location_id: LocationId(row.try_get("source_location_id").map_err(decode)?),
            target_location_id: LocationId(row.try_get("target_location_id").map_err(decode)?),
            commodity_id: CommodityId(row.try_get("commodity_id").map_err(decode)?),
            quantity: quantity_from_sql(quantity)?,
            reason: row.try_get("reason").map_err(decode)?,
            notes: row.try_get("notes").map_err(decode)?,
            estimated_completion_minutes: row
                .try_get("estimated_completion_minutes")
                .map_err(decode)?,
        },
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait]
impl RedistributionOrderRepository for SqlRedistributionOrderRepository {
    async fn find_order(
        &self,
        id: &RedistributionOrderId,
    ) -> Result<Option<RedistributionOrder>, RepositoryError> {
        let row = sqlx::query(&format!("{ORDER_COLUMNS} WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_order).transpose()
    }

    async fn list_orders_for_target(
        &self,
        target_location_id: &LocationId,
    ) -> Result<Vec<RedistributionOrder>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{ORDER_COLUMNS} WHERE target_location_id = ? ORDER BY created_at DESC, id"
        ))
        .bind(&target_location_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_order).collect()
    }

    async fn list_transfers_for_suggestion(
        &self,
        suggestion_id: &SuggestionId,
    ) -> Result<Vec<RecordedTransfer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, suggestion_id, source_location_id, target_location_id, commodity_id,
                    quantity, reason, notes, estimated_completion_minutes, created_at
             FROM transfer_execution WHERE suggestion_id = ? ORDER BY created_at, id",
        )
        .bind(&suggestion_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transfer).collect()
    }
}

#[async_trait]
impl RedistributionOrderSink for SqlRedistributionOrderRepository {
    async fn create_redistribution_order(
        &self,
        order: RedistributionOrder,
    ) -> Result<RedistributionOrderId, CollaboratorError> {
        Ok(self.record_order(&order).await?)
    }

    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, CollaboratorError> {
        Ok(self.record_transfer(&request).await?)
    }
}
