//! Normalized data models for flight offers and locations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One priced, bookable itinerary bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    /// Opaque offer identifier, unique within a response
    pub id: String,
    /// Total price
    pub price: OfferPrice,
    /// Outbound first, return second (when present)
    pub itineraries: Vec<FlightItinerary>,
    /// Connections on the itinerary with the most segments
    pub stops_count: u32,
    /// Sorted, deduplicated carrier codes
    pub airlines: Vec<String>,
}

impl FlightOffer {
    /// Returns the outbound itinerary, if any.
    pub fn outbound(&self) -> Option<&FlightItinerary> {
        self.itineraries.first()
    }

    /// Returns the return itinerary for round trips.
    pub fn inbound(&self) -> Option<&FlightItinerary> {
        self.itineraries.get(1)
    }

    /// Returns true if this offer contains a return itinerary.
    pub fn is_round_trip(&self) -> bool {
        self.itineraries.len() > 1
    }
}

/// Offer price in a single currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferPrice {
    /// Grand total, never negative
    pub total: f64,
    /// ISO-4217 currency code
    pub currency: String,
}

impl OfferPrice {
    /// Creates a new price.
    pub fn new(total: f64, currency: impl Into<String>) -> Self {
        Self { total, currency: currency.into() }
    }
}

/// One direction of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightItinerary {
    /// Door-to-door duration including layovers
    pub duration_minutes: u32,
    pub segments: Vec<FlightSegment>,
}

impl FlightItinerary {
    /// Returns the first departure of this itinerary.
    pub fn departure(&self) -> Option<&Endpoint> {
        self.segments.first().map(|s| &s.departure)
    }

    /// Returns the final arrival of this itinerary.
    pub fn arrival(&self) -> Option<&Endpoint> {
        self.segments.last().map(|s| &s.arrival)
    }

    /// Number of connections in this itinerary.
    pub fn connections(&self) -> u32 {
        self.segments.len().saturating_sub(1) as u32
    }
}

/// A single flown leg on one flight number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub id: String,
    pub carrier_code: String,
    /// Flight number without the carrier prefix
    pub number: String,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub duration_minutes: u32,
    /// Technical stops within this segment
    pub stops: u32,
}

impl FlightSegment {
    /// Returns the marketing flight designator, e.g. `AA100`.
    pub fn flight_designator(&self) -> String {
        format!("{}{}", self.carrier_code, self.number)
    }
}

/// Airport and local timestamp for a departure or arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub iata_code: String,
    /// Timestamp as sent upstream (airport-local, no offset)
    pub at: String,
}

/// Normalized offers together with the carrier dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightOffersResponse {
    pub offers: Vec<FlightOffer>,
    /// Carrier code to display name
    pub carriers: BTreeMap<String, String>,
}

impl FlightOffersResponse {
    /// Returns the display name for a carrier code, falling back to the code.
    pub fn carrier_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.carriers.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Returns number of offers.
    pub fn count(&self) -> usize {
        self.offers.len()
    }

    /// Returns true if no offers were found.
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

/// Kind of location returned by the typeahead lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocationSubType {
    Airport,
    City,
}

impl fmt::Display for LocationSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSubType::Airport => write!(f, "AIRPORT"),
            LocationSubType::City => write!(f, "CITY"),
        }
    }
}

impl FromStr for LocationSubType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AIRPORT" => Ok(LocationSubType::Airport),
            "CITY" => Ok(LocationSubType::City),
            _ => Err(format!("Unknown location subType: {}. Use: AIRPORT, CITY", s)),
        }
    }
}

/// A normalized airport or city suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationOption {
    /// Three-letter IATA code
    pub iata: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub sub_type: LocationSubType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_segment(carrier: &str, from: &str, to: &str) -> FlightSegment {
        FlightSegment {
            id: format!("{}-{}", from, to),
            carrier_code: carrier.to_string(),
            number: "100".to_string(),
            departure: Endpoint { iata_code: from.to_string(), at: "2026-01-01T08:00:00".into() },
            arrival: Endpoint { iata_code: to.to_string(), at: "2026-01-01T11:00:00".into() },
            duration_minutes: 180,
            stops: 0,
        }
    }

    fn make_offer(itineraries: Vec<FlightItinerary>) -> FlightOffer {
        FlightOffer {
            id: "1".to_string(),
            price: OfferPrice::new(199.0, "USD"),
            itineraries,
            stops_count: 0,
            airlines: vec!["AA".to_string()],
        }
    }

    #[test]
    fn test_itinerary_endpoints() {
        let itinerary = FlightItinerary {
            duration_minutes: 400,
            segments: vec![make_segment("AA", "JFK", "ORD"), make_segment("AA", "ORD", "SFO")],
        };

        assert_eq!(itinerary.departure().unwrap().iata_code, "JFK");
        assert_eq!(itinerary.arrival().unwrap().iata_code, "SFO");
        assert_eq!(itinerary.connections(), 1);
    }

    #[test]
    fn test_itinerary_empty_segments() {
        let itinerary = FlightItinerary { duration_minutes: 0, segments: Vec::new() };
        assert!(itinerary.departure().is_none());
        assert!(itinerary.arrival().is_none());
        assert_eq!(itinerary.connections(), 0);
    }

    #[test]
    fn test_offer_directions() {
        let leg = FlightItinerary { duration_minutes: 180, segments: vec![make_segment("AA", "JFK", "LAX")] };
        let one_way = make_offer(vec![leg.clone()]);
        assert!(!one_way.is_round_trip());
        assert!(one_way.outbound().is_some());
        assert!(one_way.inbound().is_none());

        let round_trip = make_offer(vec![leg.clone(), leg]);
        assert!(round_trip.is_round_trip());
        assert!(round_trip.inbound().is_some());
    }

    #[test]
    fn test_flight_designator() {
        let segment = make_segment("DL", "ATL", "BOS");
        assert_eq!(segment.flight_designator(), "DL100");
    }

    #[test]
    fn test_carrier_name_fallback() {
        let mut response = FlightOffersResponse::default();
        response.carriers.insert("AA".to_string(), "American Airlines".to_string());

        assert_eq!(response.carrier_name("AA"), "American Airlines");
        assert_eq!(response.carrier_name("ZZ"), "ZZ");
        assert!(response.is_empty());
        assert_eq!(response.count(), 0);
    }

    #[test]
    fn test_location_sub_type_parsing() {
        assert_eq!("AIRPORT".parse::<LocationSubType>().unwrap(), LocationSubType::Airport);
        assert_eq!("CITY".parse::<LocationSubType>().unwrap(), LocationSubType::City);
        assert!("airport".parse::<LocationSubType>().is_err());
        assert_eq!(LocationSubType::City.to_string(), "CITY");
    }

    #[test]
    fn test_offer_serde_uses_camel_case() {
        let offer = make_offer(Vec::new());
        let json = serde_json::to_string(&offer).unwrap();
        assert!(json.contains("\"stopsCount\":0"));

        let parsed: FlightOffer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, offer);
    }

    #[test]
    fn test_location_serde_skips_missing_country_code() {
        let location = LocationOption {
            iata: "LHR".to_string(),
            name: "HEATHROW".to_string(),
            city: "LONDON".to_string(),
            country: "UNITED KINGDOM".to_string(),
            country_code: None,
            sub_type: LocationSubType::Airport,
        };

        let json = serde_json::to_string(&location).unwrap();
        assert!(!json.contains("countryCode"));
        assert!(json.contains("\"subType\":\"AIRPORT\""));
    }
}
