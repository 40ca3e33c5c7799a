use crate::domain::suggestion::TransferSuggestion;

/// Applies the confidence cutoff and orders suggestions most-urgent first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuggestionRanker {
    confidence_threshold: f64,
}

impl SuggestionRanker {
    pub fn new(confidence_threshold: f64) -> Self {
        Self { confidence_threshold }
    }

    /// Priority tier, then confidence descending, then source location id.
    pub fn rank(&self, suggestions: Vec<TransferSuggestion>) -> Vec<TransferSuggestion> {
        let mut kept: Vec<TransferSuggestion> = suggestions
            .into_iter()
            .filter(|suggestion| suggestion.confidence_score >= self.confidence_threshold)
            .collect();

        kept.sort_by(|left, right| {
            left.priority
                .cmp(&right.priority)
                .then_with(|| right.confidence_score.total_cmp(&left.confidence_score))
                .then_with(|| left.source_location.id.cmp(&right.source_location.id))
        });
        kept
    }
}

impl Default for SuggestionRanker {
    fn default() -> Self {
        Self::new(0.6)
    }
}
