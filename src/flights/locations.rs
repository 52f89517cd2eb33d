//! Maps validated location lookups into typeahead options.

use super::models::LocationOption;
use crate::amadeus::schema::{RawLocation, RawLocationsResponse};

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn normalize_location(item: &RawLocation) -> LocationOption {
    let address = item.address.as_ref();
    let city = non_blank(address.and_then(|a| a.city_name.as_ref())).unwrap_or(item.name.trim());
    let country = non_blank(address.and_then(|a| a.country_name.as_ref())).unwrap_or_default();

    LocationOption {
        iata: item.iata_code.trim().to_string(),
        name: item.name.clone(),
        city: city.to_string(),
        country: country.to_string(),
        country_code: non_blank(address.and_then(|a| a.country_code.as_ref())).map(String::from),
        sub_type: item.sub_type,
    }
}

/// Normalizes a location response, dropping entries without an IATA code or city.
pub fn normalize_locations(response: &RawLocationsResponse) -> Vec<LocationOption> {
    response
        .data
        .iter()
        .map(normalize_location)
        .filter(|location| !location.iata.is_empty() && !location.city.is_empty())
        .collect()
}
