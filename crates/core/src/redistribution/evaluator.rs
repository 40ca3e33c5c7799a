use crate::domain::stock::StockPosition;

/// Quantifies shortage and excess of a position against configured thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StockPositionEvaluator {
    min_months_of_stock: f64,
    safety_buffer_months: f64,
}

impl StockPositionEvaluator {
    pub fn new(min_months_of_stock: f64, safety_buffer_months: f64) -> Self {
        Self { min_months_of_stock, safety_buffer_months }
    }

    pub fn min_months_of_stock(&self) -> f64 {
        self.min_months_of_stock
    }

    pub fn safety_buffer_months(&self) -> f64 {
        self.safety_buffer_months
    }

    /// Units needed to bring the position up to the minimum months of stock.
    pub fn deficit(&self, position: &StockPosition) -> f64 {
        let required = self.min_months_of_stock * position.average_monthly_consumption;
        non_negative(required - position.quantity_on_hand)
    }

    /// Units held beyond the safety buffer, available to give away.
    pub fn surplus(&self, position: &StockPosition) -> f64 {
        let reserved = self.safety_buffer_months * position.average_monthly_consumption;
        non_negative(position.quantity_on_hand - reserved)
    }

    /// A source must hold surplus and sit above the minimum coverage itself.
    pub fn is_viable_source(&self, position: &StockPosition) -> bool {
        let above_minimum = position
            .months_of_stock()
            .is_some_and(|months_of_stock| months_of_stock > self.min_months_of_stock);

        above_minimum && self.surplus(position) > 0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
