//! Canonical flight domain: models, normalizers and the duration codec.

pub mod locations;
pub mod models;
pub mod normalize;
pub mod search;
pub mod time;

pub use locations::normalize_locations;
pub use models::{
    Endpoint, FlightItinerary, FlightOffer, FlightOffersResponse, FlightSegment, LocationOption,
    LocationSubType, OfferPrice,
};
pub use normalize::normalize_offers;
pub use search::{CabinClass, SearchRequest, ValidSearch};
