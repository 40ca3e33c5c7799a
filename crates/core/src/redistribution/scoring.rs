use chrono::{DateTime, Datelike, Utc};

use super::distance::DistanceEngine;
use super::evaluator::StockPositionEvaluator;
use crate::config::RedistributionConfig;
use crate::domain::stock::StockPosition;
use crate::domain::suggestion::{
    CommodityRef, LocationSnapshot, Priority, SuggestionId, TransferSuggestion,
};
use crate::errors::RedistributionError;

pub const RISK_LONG_DISTANCE: &str = "long distance transfer";
pub const RISK_EXTENDED_TRAVEL: &str = "extended travel time";
pub const RISK_SECURITY: &str = "security concerns in region";
pub const RISK_SEASONAL: &str = "seasonal road-condition risk";

pub const BENEFIT_RESTORES_OPTIMAL: &str = "restores target to optimal levels";
pub const BENEFIT_PREVENTS_STOCKOUT: &str = "prevents stockout for the forecast window";
pub const BENEFIT_ECONOMIES_OF_SCALE: &str = "economies of scale from large transfer";

const DISTANCE_PENALTY_PER_10_KM: f64 = 0.1;
const TRAVEL_PENALTY_PER_10_MIN: f64 = 0.01;
const SURPLUS_BONUS_PER_MONTH: f64 = 0.05;
const SURPLUS_BONUS_CAP: f64 = 0.2;
const CRITICAL_URGENCY_BONUS: f64 = 0.2;
const HIGH_URGENCY_BONUS: f64 = 0.1;

/// Turns one (target, candidate) pair into a scored, annotated suggestion.
#[derive(Clone, Debug)]
pub struct SuggestionScorer {
    config: RedistributionConfig,
    evaluator: StockPositionEvaluator,
    distance: DistanceEngine,
}

impl SuggestionScorer {
    pub fn new(config: RedistributionConfig) -> Self {
        let evaluator =
            StockPositionEvaluator::new(config.min_months_of_stock, config.safety_buffer_months);
        let distance = DistanceEngine::new(config.average_speed_kmh);
        Self { config, evaluator, distance }
    }

    /// Returns `Ok(None)` when the pair yields no whole unit to move.
    ///
    /// Errors are scoped to the pair: a position that cannot be scored (bad
    /// coordinates, zero consumption) is reported as `InvalidPosition`.
    pub fn score(
        &self,
        target: &StockPosition,
        candidate: &StockPosition,
        now: DateTime<Utc>,
    ) -> Result<Option<TransferSuggestion>, RedistributionError> {
        let target_mos = scorable_months_of_stock(target)?;
        let candidate_mos = scorable_months_of_stock(candidate)?;

        let distance_km = self.distance.distance_km(
            target.latitude,
            target.longitude,
            candidate.latitude,
            candidate.longitude,
        );
        let travel_minutes = self.distance.travel_time_minutes(distance_km);

        let transferable = self.evaluator.deficit(target).min(self.evaluator.surplus(candidate));
        let suggested_quantity = transferable.floor();
        if suggested_quantity < 1.0 {
            return Ok(None);
        }
        let suggested_quantity = suggested_quantity as u64;

        let id = SuggestionId::encode(
            &candidate.location_id,
            &target.location_id,
            &target.commodity_id,
            suggested_quantity,
        )
        .ok_or_else(|| RedistributionError::InvalidPosition {
            location_id: candidate.location_id.clone(),
            reason: "location and commodity ids cannot be encoded into a suggestion id"
                .to_string(),
        })?;

        let projected_mos = (target.quantity_on_hand + suggested_quantity as f64)
            / target.average_monthly_consumption;

        Ok(Some(TransferSuggestion {
            id,
            source_location: LocationSnapshot::capture(candidate, candidate_mos),
            target_location: LocationSnapshot::capture(target, target_mos),
            commodity: CommodityRef {
                id: target.commodity_id.clone(),
                name: target.commodity_name.clone(),
            },
            suggested_quantity,
            distance_km,
            estimated_travel_time_minutes: travel_minutes,
            confidence_score: self.confidence(distance_km, travel_minutes, target_mos, candidate_mos),
            priority: Priority::from_months_of_stock(target_mos),
            risk_factors: self.risk_factors(target, candidate, distance_km, travel_minutes, now),
            benefits: self.benefits(target_mos, projected_mos, suggested_quantity),
            generated_at: now,
        }))
    }

    pub fn confidence(
        &self,
        distance_km: f64,
        travel_minutes: f64,
        target_mos: f64,
        candidate_mos: f64,
    ) -> f64 {
        let distance_penalty = (distance_km / 10.0) * DISTANCE_PENALTY_PER_10_KM;
        let surplus_bonus = ((candidate_mos - self.config.safety_buffer_months)
            * SURPLUS_BONUS_PER_MONTH)
            .min(SURPLUS_BONUS_CAP);
        let travel_penalty = (travel_minutes / 10.0) * TRAVEL_PENALTY_PER_10_MIN;
        let urgency_bonus = if target_mos < 0.5 {
            CRITICAL_URGENCY_BONUS
        } else if target_mos < 1.0 {
            HIGH_URGENCY_BONUS
        } else {
            0.0
        };

        let score = 1.0 - distance_penalty + surplus_bonus - travel_penalty + urgency_bonus;
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }

    fn risk_factors(
        &self,
        target: &StockPosition,
        candidate: &StockPosition,
        distance_km: f64,
        travel_minutes: f64,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut risks = Vec::new();
        if distance_km > self.config.long_distance_km {
            risks.push(RISK_LONG_DISTANCE.to_string());
        }
        if travel_minutes > self.config.extended_travel_minutes {
            risks.push(RISK_EXTENDED_TRAVEL.to_string());
        }
        if self.config.is_high_risk_region(&target.region_name)
            || self.config.is_high_risk_region(&candidate.region_name)
        {
            risks.push(RISK_SECURITY.to_string());
        }
        if self.config.is_rainy_month(now.month()) {
            risks.push(RISK_SEASONAL.to_string());
        }
        risks
    }

    fn benefits(&self, target_mos: f64, projected_mos: f64, suggested_quantity: u64) -> Vec<String> {
        let mut benefits = Vec::new();
        if projected_mos - target_mos >= 1.0 {
            benefits.push(BENEFIT_RESTORES_OPTIMAL.to_string());
        }
        if projected_mos >= self.config.min_months_of_stock {
            benefits.push(BENEFIT_PREVENTS_STOCKOUT.to_string());
        }
        if suggested_quantity >= self.config.bulk_transfer_threshold {
            benefits.push(BENEFIT_ECONOMIES_OF_SCALE.to_string());
        }
        benefits
    }
}

fn scorable_months_of_stock(position: &StockPosition) -> Result<f64, RedistributionError> {
    position.validate().map_err(|reason| RedistributionError::InvalidPosition {
        location_id: position.location_id.clone(),
        reason,
    })?;

    position.months_of_stock().ok_or_else(|| RedistributionError::InvalidPosition {
        location_id: position.location_id.clone(),
        reason: "average monthly consumption must be positive".to_string(),
    })
}
