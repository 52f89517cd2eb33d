//! Airline allow-list filter.

use super::Filter;
use crate::flights::FlightOffer;
use std::collections::BTreeSet;

/// Passes offers flown or validated by at least one selected carrier.
pub struct AirlineFilter {
    /// Uppercased carrier codes.
    codes: BTreeSet<String>,
}

impl AirlineFilter {
    /// Creates a new airline filter.
    pub fn new(codes: impl IntoIterator<Item = String>) -> Self {
        Self { codes: codes.into_iter().map(|c| c.trim().to_uppercase()).collect() }
    }
}

impl Filter for AirlineFilter {
    fn matches(&self, offer: &FlightOffer) -> bool {
        if self.codes.is_empty() {
            return true;
        }

        offer.airlines.iter().any(|code| self.codes.contains(code))
    }

    fn description(&self) -> String {
        if self.codes.is_empty() {
            return "Airlines: any".to_string();
        }

        format!("Airlines: {}", self.codes.iter().cloned().collect::<Vec<_>>().join(", "))
    }
}
