//! fare-scout - Flight offer search CLI
//!
//! Normalizes Amadeus flight offers, filters and ranks them, and synthesizes
//! a price trend around the travel dates.

pub mod amadeus;
pub mod commands;
pub mod config;
pub mod filters;
pub mod flights;
pub mod format;
pub mod sort;
pub mod trend;
pub mod validation;

pub use config::Config;
pub use filters::{FiltersState, PriceBounds, StopBucket};
pub use flights::{FlightOffer, FlightOffersResponse, LocationOption, SearchRequest};
pub use sort::SortMode;
pub use trend::TrendDatum;
pub use validation::ValidationError;
