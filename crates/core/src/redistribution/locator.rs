use tracing::debug;

use super::evaluator::StockPositionEvaluator;
use super::ports::StockPositionProvider;
use crate::domain::stock::StockPosition;
use crate::errors::CollaboratorError;

/// Finds nearby positions of the target's commodity that can act as sources.
///
/// The spatial query belongs to the provider; this type only applies the
/// admission rules on top of what the provider returns.
#[derive(Clone, Copy, Debug)]
pub struct CandidateLocator {
    evaluator: StockPositionEvaluator,
    radius_km: f64,
}

impl CandidateLocator {
    pub fn new(evaluator: StockPositionEvaluator, radius_km: f64) -> Self {
        Self { evaluator, radius_km }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub async fn locate(
        &self,
        provider: &dyn StockPositionProvider,
        target: &StockPosition,
    ) -> Result<Vec<StockPosition>, CollaboratorError> {
        let nearby =
            provider.find_nearby_positions(target.latitude, target.longitude, self.radius_km).await?;
        let discovered = nearby.len();

        let surplus = provider
            .filter_surplus(nearby, &target.commodity_id, self.evaluator.min_months_of_stock())
            .await?;

        let admitted: Vec<StockPosition> = surplus
            .into_iter()
            .filter(|candidate| {
                candidate.location_id != target.location_id
                    && candidate.commodity_id == target.commodity_id
                    && self.evaluator.is_viable_source(candidate)
            })
            .collect();

        debug!(
            event_name = "redistribution.candidates.located",
            target_location_id = %target.location_id,
            commodity_id = %target.commodity_id,
            radius_km = self.radius_km,
            discovered,
            admitted = admitted.len(),
            "candidate sources located"
        );

        Ok(admitted)
    }
}
