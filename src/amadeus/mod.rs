//! Amadeus-specific modules for the HTTP client, token cache, and response schema.

pub mod client;
pub mod env;
pub mod schema;
pub mod token;

pub use client::{AmadeusClient, FlightApi};
pub use env::AmadeusEnv;
pub use schema::{parse_flight_offers, parse_locations, RawFlightOffersResponse, RawLocationsResponse};
pub use token::{IssuedToken, TokenCache};
