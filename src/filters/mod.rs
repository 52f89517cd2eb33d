//! Offer filtering system with composable filters.

pub mod airline;
pub mod price;
pub mod query;
pub mod stops;

use crate::flights::FlightOffer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use airline::AirlineFilter;
pub use price::PriceFilter;
pub use stops::{StopBucket, StopsFilter};

/// Trait for filtering offers.
pub trait Filter: Send + Sync {
    /// Returns true if the offer passes the filter.
    fn matches(&self, offer: &FlightOffer) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}

/// A chain of filters that must all pass.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty filter chain.
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Adds a filter to the chain.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Checks if an offer passes all filters.
    pub fn matches(&self, offer: &FlightOffer) -> bool {
        self.filters.iter().all(|f| f.matches(offer))
    }

    /// Returns the offers that pass, in their original order.
    pub fn apply(&self, offers: &[FlightOffer]) -> Vec<FlightOffer> {
        offers.iter().filter(|o| self.matches(o)).cloned().collect()
    }

    /// Returns true if no filters are configured.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns descriptions of all filters.
    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a FilterChain, skipping criteria that are not set.
pub struct FilterChainBuilder {
    chain: FilterChain,
}

impl FilterChainBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self { chain: FilterChain::new() }
    }

    /// Adds a stop-bucket filter.
    pub fn stops(mut self, buckets: &BTreeSet<StopBucket>) -> Self {
        if !buckets.is_empty() {
            self.chain.add(StopsFilter::new(buckets.iter().copied()));
        }
        self
    }

    /// Adds an airline allow-list filter.
    pub fn airlines(mut self, codes: &BTreeSet<String>) -> Self {
        if !codes.is_empty() {
            self.chain.add(AirlineFilter::new(codes.iter().cloned()));
        }
        self
    }

    /// Adds a price range filter.
    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.chain.add(PriceFilter::new(min, max));
        }
        self
    }

    /// Builds the filter chain.
    pub fn build(self) -> FilterChain {
        self.chain
    }
}

impl Default for FilterChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowest and highest whole-unit prices over a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps a value into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Computes `floor(min total)` and `ceil(max total)`; `{0, 0}` for no offers.
pub fn price_bounds(offers: &[FlightOffer]) -> PriceBounds {
    if offers.is_empty() {
        return PriceBounds::default();
    }

    let (min, max) = offers.iter().map(|o| o.price.total).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), total| (lo.min(total), hi.max(total)),
    );

    PriceBounds { min: min.floor(), max: max.ceil() }
}

/// User-selected filter criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltersState {
    /// Empty means any stop count
    pub stops: BTreeSet<StopBucket>,
    /// Empty means any airline
    pub airlines: BTreeSet<String>,
    /// Inclusive `(min, max)` price range
    pub price_range: (f64, f64),
}

impl Default for FiltersState {
    fn default() -> Self {
        Self { stops: BTreeSet::new(), airlines: BTreeSet::new(), price_range: (0.0, f64::INFINITY) }
    }
}

impl FiltersState {
    /// Builds a state whose price range is ordered and clamped to `bounds`.
    pub fn new(
        stops: impl IntoIterator<Item = StopBucket>,
        airlines: impl IntoIterator<Item = String>,
        price_range: (f64, f64),
        bounds: PriceBounds,
    ) -> Self {
        let state = Self {
            stops: stops.into_iter().collect(),
            airlines: airlines
                .into_iter()
                .map(|a| a.trim().to_uppercase())
                .filter(|a| !a.is_empty())
                .collect(),
            price_range,
        };
        state.clamped_to(bounds)
    }

    /// A no-op filter covering the whole of `bounds`.
    pub fn for_bounds(bounds: PriceBounds) -> Self {
        Self { price_range: (bounds.min, bounds.max), ..Self::default() }
    }

    /// Returns a copy with the price range ordered and clamped to `bounds`.
    pub fn clamped_to(&self, bounds: PriceBounds) -> Self {
        let lo = bounds.clamp(self.price_range.0);
        let hi = bounds.clamp(self.price_range.1);
        Self {
            stops: self.stops.clone(),
            airlines: self.airlines.clone(),
            price_range: (lo.min(hi), lo.max(hi)),
        }
    }

    /// Returns true if neither stops nor airlines narrow the results.
    pub fn is_unrestricted(&self) -> bool {
        self.stops.is_empty() && self.airlines.is_empty()
    }

    /// Builds the equivalent filter chain.
    pub fn to_chain(&self) -> FilterChain {
        FilterChainBuilder::new()
            .stops(&self.stops)
            .airlines(&self.airlines)
            .price_range(Some(self.price_range.0), Some(self.price_range.1))
            .build()
    }
}

/// Returns the offers matching every active criterion, preserving input order.
pub fn apply_filters(offers: &[FlightOffer], filters: &FiltersState) -> Vec<FlightOffer> {
    if offers.is_empty() {
        return Vec::new();
    }

    filters.to_chain().apply(offers)
}
