use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use super::evaluator::StockPositionEvaluator;
use super::locator::CandidateLocator;
use super::ports::{Clock, RedistributionOrderSink, StockPositionProvider, SystemClock};
use super::ranking::SuggestionRanker;
use super::scoring::SuggestionScorer;
use crate::config::RedistributionConfig;
use crate::domain::stock::{CommodityId, LocationId};
use crate::domain::suggestion::{SuggestionId, TransferSuggestion};
use crate::domain::transfer::{
    ExecutionParams, OrderStatus, RedistributionOrder, RedistributionOrderId, TransferExecution,
    TransferRequest,
};
use crate::errors::RedistributionError;

/// Proposes stock transfers toward a location running short of a commodity.
///
/// Generating suggestions has no side effects; only `create_redistribution_order`
/// and `execute_transfer` reach the ordering system, and both merely forward
/// identifying data.
pub struct TransferSuggestionEngine {
    config: RedistributionConfig,
    positions: Arc<dyn StockPositionProvider>,
    orders: Arc<dyn RedistributionOrderSink>,
    clock: Arc<dyn Clock>,
    evaluator: StockPositionEvaluator,
    locator: CandidateLocator,
    scorer: SuggestionScorer,
    ranker: SuggestionRanker,
}

impl TransferSuggestionEngine {
    pub fn new(
        config: RedistributionConfig,
        positions: Arc<dyn StockPositionProvider>,
        orders: Arc<dyn RedistributionOrderSink>,
    ) -> Result<Self, RedistributionError> {
        config
            .validate()
            .map_err(|error| RedistributionError::InvalidConfiguration(error.to_string()))?;

        let evaluator =
            StockPositionEvaluator::new(config.min_months_of_stock, config.safety_buffer_months);

        Ok(Self {
            locator: CandidateLocator::new(evaluator, config.search_radius_km),
            scorer: SuggestionScorer::new(config.clone()),
            ranker: SuggestionRanker::new(config.confidence_threshold),
            evaluator,
            config,
            positions,
            orders,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RedistributionConfig {
        &self.config
    }

    pub async fn generate_suggestions(
        &self,
        target_location_id: &LocationId,
        commodity_id: &CommodityId,
    ) -> Result<Vec<TransferSuggestion>, RedistributionError> {
        let Some(target) =
            self.positions.get_stock_position(target_location_id, commodity_id).await?
        else {
            info!(
                event_name = "redistribution.target.not_found",
                target_location_id = %target_location_id,
                commodity_id = %commodity_id,
                "no stock position recorded for target"
            );
            return Ok(Vec::new());
        };

        target.validate().map_err(|reason| RedistributionError::InvalidPosition {
            location_id: target.location_id.clone(),
            reason,
        })?;

        let Some(target_mos) = target.months_of_stock() else {
            warn!(
                event_name = "redistribution.target.degenerate",
                target_location_id = %target.location_id,
                commodity_id = %commodity_id,
                "target has no consumption history; skipping suggestion generation"
            );
            return Ok(Vec::new());
        };

        if target_mos >= self.evaluator.min_months_of_stock() {
            info!(
                event_name = "redistribution.target.adequate",
                target_location_id = %target.location_id,
                commodity_id = %commodity_id,
                months_of_stock = target_mos,
                "target stock is adequate"
            );
            return Ok(Vec::new());
        }

        let candidates = self.locator.locate(self.positions.as_ref(), &target).await?;
        let now = self.clock.now();

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match self.scorer.score(&target, candidate, now) {
                Ok(Some(suggestion)) => scored.push(suggestion),
                Ok(None) => {}
                Err(error) => warn!(
                    event_name = "redistribution.candidate.skipped",
                    target_location_id = %target.location_id,
                    candidate_location_id = %candidate.location_id,
                    error = %error,
                    "candidate could not be scored"
                ),
            }
        }

        let scored_count = scored.len();
        let ranked = self.ranker.rank(scored);

        info!(
            event_name = "redistribution.suggestions.generated",
            target_location_id = %target.location_id,
            commodity_id = %commodity_id,
            months_of_stock = target_mos,
            deficit = self.evaluator.deficit(&target),
            candidates = candidates.len(),
            scored = scored_count,
            returned = ranked.len(),
            "transfer suggestions generated"
        );

        Ok(ranked)
    }

    pub async fn execute_transfer(
        &self,
        suggestion_id: &SuggestionId,
        params: ExecutionParams,
    ) -> Result<TransferExecution, RedistributionError> {
        let reference = suggestion_id
            .decode()
            .ok_or_else(|| RedistributionError::InvalidSuggestionId(suggestion_id.0.clone()))?;
        let params = normalize_params(params)?;

        let request = TransferRequest {
            suggestion_id: suggestion_id.clone(),
            source_location_id: reference.source_location_id,
            target_location_id: reference.target_location_id,
            commodity_id: reference.commodity_id,
            quantity: reference.quantity,
            reason: params.reason.clone(),
            notes: params.notes.clone(),
            estimated_completion_minutes: params.estimated_completion_minutes,
        };

        let receipt = self.orders.execute_transfer(request).await?;
        let estimated_completion_minutes = params
            .estimated_completion_minutes
            .or(receipt.estimated_completion_minutes)
            .unwrap_or(self.config.default_completion_minutes);

        info!(
            event_name = "redistribution.transfer.forwarded",
            suggestion_id = %suggestion_id,
            transfer_id = %receipt.transfer_id,
            estimated_completion_minutes,
            "transfer forwarded to ordering system"
        );

        Ok(TransferExecution {
            success: true,
            transfer_id: receipt.transfer_id,
            estimated_completion_minutes,
            notes: params.notes,
        })
    }

    pub async fn create_redistribution_order(
        &self,
        suggestion: &TransferSuggestion,
    ) -> Result<RedistributionOrderId, RedistributionError> {
        let consistent = suggestion.id.decode().is_some_and(|reference| {
            reference.source_location_id == suggestion.source_location.id
                && reference.target_location_id == suggestion.target_location.id
                && reference.commodity_id == suggestion.commodity.id
                && reference.quantity == suggestion.suggested_quantity
        });
        if !consistent {
            return Err(RedistributionError::InvalidSuggestionId(suggestion.id.0.clone()));
        }

        let order = RedistributionOrder {
            id: RedistributionOrderId(format!("RO-{}", Uuid::new_v4())),
            suggestion_id: suggestion.id.clone(),
            idempotency_key: idempotency_key(suggestion),
            source_location_id: suggestion.source_location.id.clone(),
            target_location_id: suggestion.target_location.id.clone(),
            commodity_id: suggestion.commodity.id.clone(),
            commodity_name: suggestion.commodity.name.clone(),
            quantity: suggestion.suggested_quantity,
            priority: suggestion.priority,
            confidence_score: suggestion.confidence_score,
            distance_km: suggestion.distance_km,
            status: OrderStatus::Pending,
            created_at: self.clock.now(),
        };

        let order_id = self.orders.create_redistribution_order(order).await?;
        info!(
            event_name = "redistribution.order.created",
            suggestion_id = %suggestion.id,
            order_id = %order_id,
            quantity = suggestion.suggested_quantity,
            "redistribution order created"
        );

        Ok(order_id)
    }
}

fn normalize_params(params: ExecutionParams) -> Result<ExecutionParams, RedistributionError> {
    if params.estimated_completion_minutes == Some(0) {
        return Err(RedistributionError::InvalidExecutionParams(
            "estimated completion minutes must be greater than zero".to_string(),
        ));
    }

    Ok(ExecutionParams {
        reason: non_blank(params.reason),
        notes: non_blank(params.notes),
        estimated_completion_minutes: params.estimated_completion_minutes,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Same transfer on the same UTC day maps to one key, across runs.
fn idempotency_key(suggestion: &TransferSuggestion) -> String {
    let mut hasher = Sha256::new();
    for part in [
        suggestion.source_location.id.0.as_str(),
        suggestion.target_location.id.0.as_str(),
        suggestion.commodity.id.0.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f_u8]);
    }
    hasher.update(suggestion.suggested_quantity.to_be_bytes());
    let planning_day = suggestion.generated_at.date_naive().format("%Y-%m-%d").to_string();
    hasher.update(planning_day.as_bytes());

    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("sha256:{hex}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::TransferSuggestionEngine;
    use crate::config::RedistributionConfig;
    use crate::domain::stock::fixtures::position;
    use crate::domain::stock::{CommodityId, LocationId, StockPosition};
    use crate::domain::suggestion::{Priority, SuggestionId};
    use crate::domain::transfer::{ExecutionParams, OrderStatus};
    use crate::errors::{CollaboratorError, RedistributionError};
    use crate::redistribution::ports::FixedClock;
    use crate::redistribution::scoring::RISK_LONG_DISTANCE;
    use crate::redistribution::testing::{RecordingOrderSink, StaticPositions};

    fn lagos_target() -> StockPosition {
        position("ikeja", 50.0, 150.0, 6.5, 3.4)
    }

    fn engine_with(
        config: RedistributionConfig,
        positions: Arc<StaticPositions>,
        orders: Arc<RecordingOrderSink>,
    ) -> TransferSuggestionEngine {
        let january = Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).single().expect("valid timestamp");
        TransferSuggestionEngine::new(config, positions, orders)
            .expect("valid configuration")
            .with_clock(Arc::new(FixedClock(january)))
    }

    fn ids(location: &str, commodity: &str) -> (LocationId, CommodityId) {
        (LocationId(location.to_string()), CommodityId(commodity.to_string()))
    }

    #[tokio::test]
    async fn end_to_end_lagos_scenario() {
        let positions = Arc::new(StaticPositions::new(vec![
            lagos_target(),
            position("abeokuta", 1500.0, 100.0, 7.4, 3.9),
        ]));
        let config = RedistributionConfig {
            search_radius_km: 150.0,
            confidence_threshold: 0.0,
            ..RedistributionConfig::default()
        };
        let engine = engine_with(config, positions, Arc::new(RecordingOrderSink::default()));

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert_eq!(suggestions.len(), 1);
        let suggestion = &suggestions[0];
        assert_eq!(suggestion.suggested_quantity, 100);
        assert_eq!(suggestion.priority, Priority::Critical);
        assert!(suggestion.risk_factors.iter().any(|risk| risk == RISK_LONG_DISTANCE));
        assert!((0.0..=1.0).contains(&suggestion.confidence_score));
        assert_eq!(suggestion.source_location.id.0, "abeokuta");
    }

    #[tokio::test]
    async fn default_cutoff_drops_a_far_low_confidence_source() {
        let positions = Arc::new(StaticPositions::new(vec![
            lagos_target(),
            position("abeokuta", 1500.0, 100.0, 7.4, 3.9),
        ]));
        let config =
            RedistributionConfig { search_radius_km: 150.0, ..RedistributionConfig::default() };
        let engine = engine_with(config, positions, Arc::new(RecordingOrderSink::default()));

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn adequate_target_skips_candidate_discovery() {
        let positions = Arc::new(StaticPositions::new(vec![
            position("ikeja", 150.0, 150.0, 6.5, 3.4),
            position("ota", 1500.0, 100.0, 6.52, 3.42),
        ]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions.clone(),
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert!(suggestions.is_empty());
        assert_eq!(positions.nearby_calls(), 0);
        assert_eq!(positions.filter_calls(), 0);
    }

    #[tokio::test]
    async fn missing_target_is_an_empty_result() {
        let positions = Arc::new(StaticPositions::new(vec![position("ota", 1500.0, 100.0, 6.52, 3.42)]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions.clone(),
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert!(suggestions.is_empty());
        assert_eq!(positions.nearby_calls(), 0);
    }

    #[tokio::test]
    async fn candidates_without_surplus_yield_nothing() {
        let positions = Arc::new(StaticPositions::new(vec![
            lagos_target(),
            position("ota", 400.0, 100.0, 6.52, 3.42),
            position("agege", 350.0, 100.0, 6.6, 3.3),
        ]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions.clone(),
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert!(suggestions.is_empty());
        assert_eq!(positions.nearby_calls(), 1);
    }

    #[tokio::test]
    async fn ranks_nearby_sources_and_is_repeatable() {
        let positions = Arc::new(StaticPositions::new(vec![
            position("ikeja", 90.0, 100.0, 6.5, 3.4),
            position("ota", 2000.0, 100.0, 6.7, 3.2),
            position("agege", 2000.0, 100.0, 6.52, 3.42),
            position("ikorodu", 600.0, 100.0, 6.8, 3.6),
        ]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions,
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let first = engine.generate_suggestions(&location, &commodity).await.expect("suggestions");
        let second = engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        let order: Vec<&str> = first.iter().map(|s| s.source_location.id.0.as_str()).collect();
        assert_eq!(order, vec!["agege", "ota", "ikorodu"]);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|pair| pair[0].confidence_score >= pair[1].confidence_score));
    }

    #[tokio::test]
    async fn one_broken_candidate_does_not_abort_the_batch() {
        let mut broken = position("broken", 2000.0, 100.0, 6.51, 3.41);
        broken.location_id = LocationId("bro|ken".to_string());
        let positions = Arc::new(StaticPositions::new(vec![
            position("ikeja", 20.0, 100.0, 6.5, 3.4),
            broken,
            position("ota", 2000.0, 100.0, 6.55, 3.45),
        ]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions,
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].source_location.id.0, "ota");
    }

    #[tokio::test]
    async fn zero_consumption_target_yields_empty_list() {
        let positions = Arc::new(StaticPositions::new(vec![
            position("ikeja", 0.0, 0.0, 6.5, 3.4),
            position("ota", 2000.0, 100.0, 6.55, 3.45),
        ]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions.clone(),
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");

        assert!(suggestions.is_empty());
        assert_eq!(positions.nearby_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_target_coordinates_are_an_error() {
        let positions =
            Arc::new(StaticPositions::new(vec![position("ikeja", 10.0, 100.0, 6.5, 200.0)]));
        let engine = engine_with(
            RedistributionConfig::default(),
            positions,
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let error =
            engine.generate_suggestions(&location, &commodity).await.expect_err("should fail");

        assert!(matches!(error, RedistributionError::InvalidPosition { .. }));
    }

    #[test]
    fn inverted_thresholds_are_rejected_at_construction() {
        let config = RedistributionConfig {
            min_months_of_stock: 4.0,
            safety_buffer_months: 4.0,
            ..RedistributionConfig::default()
        };
        let result = TransferSuggestionEngine::new(
            config,
            Arc::new(StaticPositions::new(Vec::new())),
            Arc::new(RecordingOrderSink::default()),
        );

        assert!(matches!(result, Err(RedistributionError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn execute_transfer_forwards_identifying_fields() {
        let orders = Arc::new(RecordingOrderSink::default());
        let engine = engine_with(
            RedistributionConfig::default(),
            Arc::new(StaticPositions::new(Vec::new())),
            orders.clone(),
        );

        let execution = engine
            .execute_transfer(
                &SuggestionId("ota|ikeja|bcg|80".to_string()),
                ExecutionParams {
                    reason: Some("  stockout risk ".to_string()),
                    notes: Some("   ".to_string()),
                    estimated_completion_minutes: None,
                },
            )
            .await
            .expect("execute");

        assert!(execution.success);
        assert_eq!(execution.estimated_completion_minutes, 240);
        assert_eq!(execution.notes, None);
        assert_eq!(execution.transfer_id.0, "TRF-ota|ikeja|bcg|80");

        let requests = orders.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source_location_id.0, "ota");
        assert_eq!(requests[0].target_location_id.0, "ikeja");
        assert_eq!(requests[0].commodity_id.0, "bcg");
        assert_eq!(requests[0].quantity, 80);
        assert_eq!(requests[0].reason.as_deref(), Some("stockout risk"));
    }

    #[tokio::test]
    async fn execute_transfer_prefers_caller_then_receipt_estimate() {
        let orders = Arc::new(RecordingOrderSink::with_receipt_minutes(90));
        let engine = engine_with(
            RedistributionConfig::default(),
            Arc::new(StaticPositions::new(Vec::new())),
            orders,
        );
        let id = SuggestionId("ota|ikeja|bcg|80".to_string());

        let from_receipt =
            engine.execute_transfer(&id, ExecutionParams::default()).await.expect("execute");
        assert_eq!(from_receipt.estimated_completion_minutes, 90);

        let from_caller = engine
            .execute_transfer(
                &id,
                ExecutionParams { estimated_completion_minutes: Some(45), ..ExecutionParams::default() },
            )
            .await
            .expect("execute");
        assert_eq!(from_caller.estimated_completion_minutes, 45);
    }

    #[tokio::test]
    async fn execute_transfer_rejects_bad_input_before_forwarding() {
        let orders = Arc::new(RecordingOrderSink::default());
        let engine = engine_with(
            RedistributionConfig::default(),
            Arc::new(StaticPositions::new(Vec::new())),
            orders.clone(),
        );

        let bad_id = engine
            .execute_transfer(&SuggestionId("not-a-suggestion".to_string()), ExecutionParams::default())
            .await
            .expect_err("bad id");
        assert!(matches!(bad_id, RedistributionError::InvalidSuggestionId(_)));

        let bad_eta = engine
            .execute_transfer(
                &SuggestionId("ota|ikeja|bcg|80".to_string()),
                ExecutionParams { estimated_completion_minutes: Some(0), ..ExecutionParams::default() },
            )
            .await
            .expect_err("bad eta");
        assert!(matches!(bad_eta, RedistributionError::InvalidExecutionParams(_)));
        assert!(orders.requests().is_empty());
    }

    #[tokio::test]
    async fn ordering_system_rejection_propagates() {
        let engine = engine_with(
            RedistributionConfig::default(),
            Arc::new(StaticPositions::new(Vec::new())),
            Arc::new(RecordingOrderSink::rejecting("requisition window closed")),
        );

        let error = engine
            .execute_transfer(&SuggestionId("ota|ikeja|bcg|80".to_string()), ExecutionParams::default())
            .await
            .expect_err("rejected");

        assert_eq!(
            error,
            RedistributionError::Collaborator(CollaboratorError::Rejected(
                "requisition window closed".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn discovery_failure_propagates() {
        let positions = StaticPositions::new(vec![lagos_target()]).with_failing_discovery();
        let engine = engine_with(
            RedistributionConfig::default(),
            Arc::new(positions),
            Arc::new(RecordingOrderSink::default()),
        );

        let (location, commodity) = ids("ikeja", "bcg");
        let error =
            engine.generate_suggestions(&location, &commodity).await.expect_err("should fail");

        assert!(matches!(
            error,
            RedistributionError::Collaborator(CollaboratorError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn order_for_tampered_suggestion_is_refused() {
        let positions = Arc::new(StaticPositions::new(vec![
            position("ikeja", 20.0, 100.0, 6.5, 3.4),
            position("ota", 2000.0, 100.0, 6.55, 3.45),
        ]));
        let orders = Arc::new(RecordingOrderSink::default());
        let engine = engine_with(RedistributionConfig::default(), positions, orders.clone());

        let (location, commodity) = ids("ikeja", "bcg");
        let mut suggestion = engine
            .generate_suggestions(&location, &commodity)
            .await
            .expect("suggestions")
            .remove(0);
        suggestion.suggested_quantity += 1;

        let error = engine.create_redistribution_order(&suggestion).await.expect_err("refused");
        assert!(matches!(error, RedistributionError::InvalidSuggestionId(_)));
        assert!(orders.orders().is_empty());
    }

    #[tokio::test]
    async fn create_order_carries_suggestion_fields_and_stable_key() {
        let positions = Arc::new(StaticPositions::new(vec![
            position("ikeja", 20.0, 100.0, 6.5, 3.4),
            position("ota", 2000.0, 100.0, 6.55, 3.45),
        ]));
        let orders = Arc::new(RecordingOrderSink::default());
        let engine = engine_with(RedistributionConfig::default(), positions, orders.clone());

        let (location, commodity) = ids("ikeja", "bcg");
        let suggestions =
            engine.generate_suggestions(&location, &commodity).await.expect("suggestions");
        let suggestion = suggestions.first().expect("one suggestion");

        let first_id = engine.create_redistribution_order(suggestion).await.expect("order");
        let second_id = engine.create_redistribution_order(suggestion).await.expect("order");
        assert_ne!(first_id, second_id);

        let recorded = orders.orders();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].idempotency_key, recorded[1].idempotency_key);
        assert!(recorded[0].idempotency_key.starts_with("sha256:"));
        assert_eq!(recorded[0].quantity, suggestion.suggested_quantity);
        assert_eq!(recorded[0].source_location_id.0, "ota");
        assert_eq!(recorded[0].target_location_id.0, "ikeja");
        assert_eq!(recorded[0].status, OrderStatus::Pending);
        assert_eq!(recorded[0].suggestion_id, suggestion.id);
    }

    #[tokio::test]
    async fn order_key_is_shared_by_reruns_on_the_same_day() {
        let network = || {
            Arc::new(StaticPositions::new(vec![
                position("ikeja", 20.0, 100.0, 6.5, 3.4),
                position("ota", 2000.0, 100.0, 6.55, 3.45),
            ]))
        };
        let at = |day: u32, hour: u32| {
            Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).single().expect("valid timestamp"),
            ))
        };
        let orders = Arc::new(RecordingOrderSink::default());
        let (location, commodity) = ids("ikeja", "bcg");

        for clock in [at(20, 8), at(20, 17), at(21, 8)] {
            let engine = TransferSuggestionEngine::new(
                RedistributionConfig::default(),
                network(),
                orders.clone(),
            )
            .expect("valid configuration")
            .with_clock(clock);
            let suggestions =
                engine.generate_suggestions(&location, &commodity).await.expect("suggestions");
            engine.create_redistribution_order(&suggestions[0]).await.expect("order");
        }

        let recorded = orders.orders();
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0].idempotency_key, recorded[1].idempotency_key);
        assert_ne!(recorded[1].idempotency_key, recorded[2].idempotency_key);
    }
}
