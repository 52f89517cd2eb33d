//! Price range filter.

use super::Filter;
use crate::flights::FlightOffer;

/// Filters offers by total price, inclusive at both ends.
pub struct PriceFilter {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceFilter {
    /// Creates a new price filter with optional min/max bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Filter for PriceFilter {
    fn matches(&self, offer: &FlightOffer) -> bool {
        let total = offer.price.total;

        if let Some(min) = self.min {
            if total < min {
                return false;
            }
        }

        if let Some(max) = self.max {
            if total > max {
                return false;
            }
        }

        true
    }

    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) if max.is_finite() => format!("Price: {:.0} - {:.0}", min, max),
            (Some(min), _) => format!("Price: >= {:.0}", min),
            (None, Some(max)) => format!("Price: <= {:.0}", max),
            (None, None) => "Price: any".to_string(),
        }
    }
}
