//! Transfer suggestion pipeline: locate surplus sources near a short target,
//! score each pair, and rank the result.

pub mod distance;
pub mod engine;
pub mod evaluator;
pub mod locator;
pub mod ports;
pub mod ranking;
pub mod scoring;

#[cfg(test)]
pub(crate) mod testing;

pub use distance::{haversine_km, DistanceEngine, EARTH_RADIUS_KM};
pub use engine::TransferSuggestionEngine;
pub use evaluator::StockPositionEvaluator;
pub use locator::CandidateLocator;
pub use ports::{Clock, FixedClock, RedistributionOrderSink, StockPositionProvider, SystemClock};
pub use ranking::SuggestionRanker;
pub use scoring::SuggestionScorer;
