use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::commands::{
    build_runtime, engine_failure, load_config, open_database, to_data, CommandResult, Failure,
};
use vaxflow_core::config::AppConfig;
use vaxflow_core::domain::stock::{CommodityId, LocationId};
use vaxflow_core::redistribution::TransferSuggestionEngine;
use vaxflow_db::{DbPool, SqlRedistributionOrderRepository, SqlStockPositionRepository};

pub fn run(location: &str, commodity: &str, create_orders: bool) -> CommandResult {
    let config = match load_config("suggest") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("suggest") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let location_id = LocationId(location.trim().to_string());
    let commodity_id = CommodityId(commodity.trim().to_string());

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let outcome = suggest(&config, &pool, &location_id, &commodity_id, create_orders).await;
        pool.close().await;
        outcome
    });

    match result {
        Ok((count, data)) => CommandResult::success_with_data(
            "suggest",
            format!("{count} transfer suggestions for {}/{}", location_id.0, commodity_id.0),
            Some(data),
        ),
        Err(failure) => CommandResult::from_failure("suggest", failure),
    }
}

async fn suggest(
    config: &AppConfig,
    pool: &DbPool,
    location_id: &LocationId,
    commodity_id: &CommodityId,
    create_orders: bool,
) -> Result<(usize, serde_json::Value), Failure> {
    let correlation_id = format!("suggest:{}/{}", location_id.0, commodity_id.0);
    let failure = |error| engine_failure(&correlation_id, error);

    let engine = build_engine(config, pool, &correlation_id)?;
    let suggestions =
        engine.generate_suggestions(location_id, commodity_id).await.map_err(failure)?;

    let mut order_ids = Vec::new();
    if create_orders {
        for suggestion in &suggestions {
            let order_id = engine.create_redistribution_order(suggestion).await.map_err(failure)?;
            order_ids.push(order_id);
        }
        info!(
            event_name = "cli.suggest.orders_created",
            target_location_id = %location_id.0,
            orders = order_ids.len(),
            "recorded pending redistribution orders"
        );
    }

    let data = json!({
        "suggestions": to_data(&suggestions)?,
        "order_ids": to_data(&order_ids)?,
    });
    Ok((suggestions.len(), data))
}

pub(crate) fn build_engine(
    config: &AppConfig,
    pool: &DbPool,
    correlation_id: &str,
) -> Result<TransferSuggestionEngine, Failure> {
    TransferSuggestionEngine::new(
        config.redistribution.clone(),
        Arc::new(SqlStockPositionRepository::new(pool.clone())),
        Arc::new(SqlRedistributionOrderRepository::new(pool.clone())),
    )
    .map_err(|error| engine_failure(correlation_id, error))
}
