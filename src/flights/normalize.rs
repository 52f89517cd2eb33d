//! Maps validated Amadeus flight offers into the canonical model.

use super::models::{
    Endpoint, FlightItinerary, FlightOffer, FlightOffersResponse, FlightSegment, OfferPrice,
};
use super::time::parse_iso_duration_to_minutes;
use crate::amadeus::schema::{RawEndpoint, RawFlightOffersResponse, RawOffer};
use std::collections::BTreeSet;

/// Parses a decimal price string, falling back to 0 for anything unusable.
///
/// The whole string must be a number; a numeric prefix such as `"199.99USD"` is not read.
pub fn parse_price(value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(total) if total.is_finite() && total >= 0.0 => total,
        _ => 0.0,
    }
}

fn endpoint(raw: &RawEndpoint) -> Endpoint {
    Endpoint { iata_code: raw.iata_code.clone(), at: raw.at.clone() }
}

/// Normalizes a single raw offer.
pub fn normalize_offer(offer: &RawOffer) -> FlightOffer {
    let itineraries: Vec<FlightItinerary> = offer
        .itineraries
        .iter()
        .map(|itinerary| {
            let segments = itinerary
                .segments
                .iter()
                .enumerate()
                .map(|(index, segment)| FlightSegment {
                    id: segment.id.clone().unwrap_or_else(|| {
                        format!("{}-{}-{}", offer.id, index, segment.carrier_code)
                    }),
                    carrier_code: segment.carrier_code.clone(),
                    number: segment.number.clone(),
                    departure: endpoint(&segment.departure),
                    arrival: endpoint(&segment.arrival),
                    duration_minutes: parse_iso_duration_to_minutes(&segment.duration),
                    stops: segment.number_of_stops.unwrap_or(0),
                })
                .collect();

            FlightItinerary {
                duration_minutes: parse_iso_duration_to_minutes(&itinerary.duration),
                segments,
            }
        })
        .collect();

    let stops_count = itineraries.iter().map(FlightItinerary::connections).max().unwrap_or(0);

    let mut airlines: BTreeSet<String> =
        offer.validating_airline_codes.iter().flatten().cloned().collect();
    for itinerary in &itineraries {
        airlines.extend(itinerary.segments.iter().map(|s| s.carrier_code.clone()));
    }

    FlightOffer {
        id: offer.id.clone(),
        price: OfferPrice::new(parse_price(&offer.price.total), offer.price.currency.clone()),
        itineraries,
        stops_count,
        airlines: airlines.into_iter().collect(),
    }
}

/// Normalizes a whole search response, passing the carrier dictionary through.
pub fn normalize_offers(response: &RawFlightOffersResponse) -> FlightOffersResponse {
    let carriers = response
        .dictionaries
        .as_ref()
        .and_then(|d| d.carriers.clone())
        .unwrap_or_default();

    FlightOffersResponse { offers: response.data.iter().map(normalize_offer).collect(), carriers }
}
