//! Raw Amadeus response shapes and the validation stage that produces them.
//!
//! Bodies are checked field by field against the expected shape first, so a
//! malformed response reports every offending path at once. Only a body that
//! passes is deserialized into the typed structures below, which is all the
//! normalizers ever see.

use crate::validation::{FieldIssue, ValidationError, Validator};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// OAuth2 client-credentials token response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawToken {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Departure or arrival point of a raw segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpoint {
    pub iata_code: String,
    pub at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    #[serde(default)]
    pub id: Option<String>,
    pub carrier_code: String,
    pub number: String,
    pub departure: RawEndpoint,
    pub arrival: RawEndpoint,
    /// ISO-8601 duration, e.g. `PT2H10M`
    pub duration: String,
    /// Any JSON number is accepted
    #[serde(default, deserialize_with = "lenient_stops")]
    pub number_of_stops: Option<u32>,
}

/// Reads a stop count from any JSON number.
///
/// Fractions are truncated, and negative or non-finite values become 0.
fn lenient_stops<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|n| if n.is_finite() && n > 0.0 { n.min(u32::MAX as f64) as u32 } else { 0 }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItinerary {
    pub duration: String,
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrice {
    /// Decimal string, e.g. `"123.45"`
    pub total: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    pub id: String,
    pub price: RawPrice,
    pub itineraries: Vec<RawItinerary>,
    #[serde(default)]
    pub validating_airline_codes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDictionaries {
    #[serde(default)]
    pub carriers: Option<BTreeMap<String, String>>,
}

/// `GET /v2/shopping/flight-offers` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFlightOffersResponse {
    pub data: Vec<RawOffer>,
    #[serde(default)]
    pub dictionaries: Option<RawDictionaries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    pub iata_code: String,
    pub name: String,
    pub sub_type: crate::flights::LocationSubType,
    #[serde(default)]
    pub address: Option<RawAddress>,
}

/// `GET /v1/reference-data/locations` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLocationsResponse {
    pub data: Vec<RawLocation>,
}

/// Error payload returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawErrorResponse {
    #[serde(default)]
    pub errors: Vec<RawApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawApiError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl RawErrorResponse {
    /// Returns the first human-readable message, if any.
    pub fn first_message(&self) -> Option<String> {
        self.errors.iter().find_map(|e| e.detail.clone().or_else(|| e.title.clone()))
    }
}

const UNEXPECTED_RESPONSE: &str = "Unexpected response from Amadeus";

fn parse_json(body: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(body).map_err(|e| {
        ValidationError::new(UNEXPECTED_RESPONSE, vec![FieldIssue::new("", e.to_string())])
    })
}

fn into_typed<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| {
        ValidationError::new(UNEXPECTED_RESPONSE, vec![FieldIssue::new("", e.to_string())])
    })
}

/// Validates and parses a token response.
pub fn parse_token(body: &str) -> Result<RawToken, ValidationError> {
    let value = parse_json(body)?;
    let mut v = Validator::new();

    if let Some(obj) = v.object(&value, "") {
        v.string(obj, "access_token", "");
        v.unsigned(obj, "expires_in", "");
        v.optional_string(obj, "token_type", "");
    }

    v.finish("Unexpected token response from Amadeus")?;
    into_typed(value)
}

fn check_endpoint(v: &mut Validator, seg: &serde_json::Map<String, Value>, key: &str, path: &str) {
    if let Some(endpoint) = v.child(seg, key, path) {
        let path = crate::validation::join(path, key);
        v.string(endpoint, "iataCode", &path);
        v.string(endpoint, "at", &path);
    }
}

fn check_offer(v: &mut Validator, value: &Value, path: &str) {
    let Some(offer) = v.object(value, path) else {
        return;
    };

    v.string(offer, "id", path);

    if let Some(price) = v.child(offer, "price", path) {
        let price_path = format!("{}.price", path);
        v.string(price, "total", &price_path);
        v.string(price, "currency", &price_path);
    }

    if let Some(itineraries) = v.array(offer, "itineraries", path) {
        for (i, itinerary) in itineraries.iter().enumerate() {
            let it_path = format!("{}.itineraries[{}]", path, i);
            let Some(it) = v.object(itinerary, &it_path) else {
                continue;
            };
            v.string(it, "duration", &it_path);

            let Some(segments) = v.array(it, "segments", &it_path) else {
                continue;
            };
            for (j, segment) in segments.iter().enumerate() {
                let seg_path = format!("{}.segments[{}]", it_path, j);
                let Some(seg) = v.object(segment, &seg_path) else {
                    continue;
                };
                v.optional_string(seg, "id", &seg_path);
                v.string(seg, "carrierCode", &seg_path);
                v.string(seg, "number", &seg_path);
                check_endpoint(v, seg, "departure", &seg_path);
                check_endpoint(v, seg, "arrival", &seg_path);
                v.string(seg, "duration", &seg_path);
                v.optional_number(seg, "numberOfStops", &seg_path);
            }
        }
    }

    v.optional_string_array(offer, "validatingAirlineCodes", path);
}

/// Validates and parses a flight-offers search response.
pub fn parse_flight_offers(body: &str) -> Result<RawFlightOffersResponse, ValidationError> {
    let value = parse_json(body)?;
    let mut v = Validator::new();

    if let Some(root) = v.object(&value, "") {
        if let Some(data) = v.array(root, "data", "") {
            for (i, offer) in data.iter().enumerate() {
                check_offer(&mut v, offer, &format!("data[{}]", i));
            }
        }

        if let Some(dictionaries) = v.optional_child(root, "dictionaries", "") {
            v.optional_string_map(dictionaries, "carriers", "dictionaries");
        }
    }

    v.finish(UNEXPECTED_RESPONSE)?;
    into_typed(value)
}

/// Validates and parses a location search response.
pub fn parse_locations(body: &str) -> Result<RawLocationsResponse, ValidationError> {
    let value = parse_json(body)?;
    let mut v = Validator::new();

    if let Some(root) = v.object(&value, "") {
        if let Some(data) = v.array(root, "data", "") {
            for (i, item) in data.iter().enumerate() {
                let path = format!("data[{}]", i);
                let Some(location) = v.object(item, &path) else {
                    continue;
                };
                v.string(location, "iataCode", &path);
                v.string(location, "name", &path);
                v.one_of(location, "subType", &path, &["AIRPORT", "CITY"]);

                if let Some(address) = v.optional_child(location, "address", &path) {
                    let addr_path = format!("{}.address", path);
                    v.optional_string(address, "cityName", &addr_path);
                    v.optional_string(address, "countryName", &addr_path);
                    v.optional_string(address, "countryCode", &addr_path);
                }
            }
        }
    }

    v.finish(UNEXPECTED_RESPONSE)?;
    into_typed(value)
}

/// Parses an error body, tolerating anything.
pub fn parse_error(body: &str) -> RawErrorResponse {
    serde_json::from_str(body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::LocationSubType;

    const OFFERS: &str = r#"{
        "data": [{
            "id": "1",
            "price": { "total": "123.45", "currency": "USD" },
            "itineraries": [{
                "duration": "PT6H",
                "segments": [{
                    "carrierCode": "AA",
                    "number": "100",
                    "departure": { "iataCode": "JFK", "at": "2026-01-01T08:00:00" },
                    "arrival": { "iataCode": "LAX", "at": "2026-01-01T11:00:00" },
                    "duration": "PT6H",
                    "numberOfStops": 0
                }]
            }],
            "validatingAirlineCodes": ["AA"]
        }],
        "dictionaries": { "carriers": { "AA": "American Airlines" } }
    }"#;

    #[test]
    fn test_parse_flight_offers_valid() {
        let parsed = parse_flight_offers(OFFERS).unwrap();
        assert_eq!(parsed.data.len(), 1);

        let offer = &parsed.data[0];
        assert_eq!(offer.id, "1");
        assert_eq!(offer.price.total, "123.45");
        assert_eq!(offer.itineraries[0].segments[0].carrier_code, "AA");
        assert!(offer.itineraries[0].segments[0].id.is_none());
        assert_eq!(offer.validating_airline_codes.as_deref(), Some(&["AA".to_string()][..]));

        let carriers = parsed.dictionaries.unwrap().carriers.unwrap();
        assert_eq!(carriers["AA"], "American Airlines");
    }

    #[test]
    fn test_parse_flight_offers_minimal() {
        let parsed = parse_flight_offers(r#"{"data": []}"#).unwrap();
        assert!(parsed.data.is_empty());
        assert!(parsed.dictionaries.is_none());
    }

    #[test]
    fn test_parse_flight_offers_reports_all_issues() {
        let body = r#"{
            "data": [{
                "id": 7,
                "price": { "total": 123.45 },
                "itineraries": [{
                    "segments": [{
                        "carrierCode": "AA",
                        "number": "100",
                        "departure": { "iataCode": "JFK" },
                        "arrival": { "iataCode": "LAX", "at": "2026-01-01T11:00:00" },
                        "duration": "PT6H",
                        "numberOfStops": "zero"
                    }]
                }]
            }]
        }"#;

        let err = parse_flight_offers(body).unwrap_err();
        assert!(err.has_issue("data[0].id"));
        assert!(err.has_issue("data[0].price.total"));
        assert!(err.has_issue("data[0].price.currency"));
        assert!(err.has_issue("data[0].itineraries[0].duration"));
        assert!(err.has_issue("data[0].itineraries[0].segments[0].departure.at"));
        assert!(err.has_issue("data[0].itineraries[0].segments[0].numberOfStops"));
        assert_eq!(err.issues.len(), 6);
    }

    #[test]
    fn test_parse_flight_offers_missing_data() {
        let err = parse_flight_offers(r#"{"meta": {}}"#).unwrap_err();
        assert!(err.has_issue("data"));
        assert!(err.to_string().contains("Unexpected response from Amadeus"));
    }

    #[test]
    fn test_parse_flight_offers_bad_carrier_dictionary() {
        let err = parse_flight_offers(r#"{"data": [], "dictionaries": {"carriers": {"AA": 1}}}"#)
            .unwrap_err();
        assert!(err.has_issue("dictionaries.carriers.AA"));
    }

    #[test]
    fn test_parse_flight_offers_invalid_json() {
        let err = parse_flight_offers("<html>").unwrap_err();
        assert_eq!(err.issues.len(), 1);
    }

    #[test]
    fn test_parse_locations() {
        let body = r#"{"data": [
            {"iataCode": "LHR", "name": "HEATHROW", "subType": "AIRPORT",
             "address": {"cityName": "LONDON", "countryName": "UNITED KINGDOM", "countryCode": "GB"}},
            {"iataCode": "PAR", "name": "PARIS", "subType": "CITY"}
        ]}"#;

        let parsed = parse_locations(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].sub_type, LocationSubType::Airport);
        assert_eq!(parsed.data[1].sub_type, LocationSubType::City);
        assert!(parsed.data[1].address.is_none());
    }

    #[test]
    fn test_parse_locations_bad_sub_type() {
        let body = r#"{"data": [{"iataCode": "XYZ", "name": "Somewhere", "subType": "TRAIN"}]}"#;
        let err = parse_locations(body).unwrap_err();
        assert!(err.has_issue("data[0].subType"));
    }

    #[test]
    fn test_parse_token() {
        let token = parse_token(
            r#"{"access_token": "abc", "expires_in": 1799, "token_type": "Bearer"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 1799);

        let err = parse_token(r#"{"expires_in": "soon"}"#).unwrap_err();
        assert!(err.has_issue("access_token"));
        assert!(err.has_issue("expires_in"));
    }

    #[test]
    fn test_parse_token_rejects_fractional_lifetime() {
        let err = parse_token(r#"{"access_token": "abc", "expires_in": 1799.5}"#).unwrap_err();
        assert!(err.has_issue("expires_in"));

        let err = parse_token(r#"{"access_token": "abc", "expires_in": -1}"#).unwrap_err();
        assert!(err.has_issue("expires_in"));
    }

    fn stops_parsed_from(raw: &str) -> Option<u32> {
        let body = OFFERS.replace(r#""numberOfStops": 0"#, &format!(r#""numberOfStops": {}"#, raw));
        let parsed = parse_flight_offers(&body).unwrap();
        parsed.data[0].itineraries[0].segments[0].number_of_stops
    }

    #[test]
    fn test_number_of_stops_accepts_any_number() {
        assert_eq!(stops_parsed_from("2"), Some(2));
        assert_eq!(stops_parsed_from("1.0"), Some(1));
        assert_eq!(stops_parsed_from("1.7"), Some(1));
        assert_eq!(stops_parsed_from("-1"), Some(0));
        assert_eq!(stops_parsed_from("1e12"), Some(u32::MAX));
        assert_eq!(stops_parsed_from("null"), None);
    }

    #[test]
    fn test_number_of_stops_wrong_type_has_path() {
        let body = OFFERS.replace(r#""numberOfStops": 0"#, r#""numberOfStops": "one""#);
        let err = parse_flight_offers(&body).unwrap_err();
        assert!(err.has_issue("data[0].itineraries[0].segments[0].numberOfStops"));
    }

    #[test]
    fn test_parse_error_body() {
        let parsed = parse_error(r#"{"errors": [{"status": 400, "detail": "Bad date"}]}"#);
        assert_eq!(parsed.first_message().as_deref(), Some("Bad date"));

        let parsed = parse_error("not json");
        assert!(parsed.first_message().is_none());
    }
}
