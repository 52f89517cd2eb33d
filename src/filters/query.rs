//! Query-string encoding of filter state (`stops=0,1&airlines=AA,DL&priceMin=200`).

use super::{FiltersState, PriceBounds, StopBucket};

/// Filter values as decoded from a query string, before clamping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilterParams {
    pub stops: Vec<StopBucket>,
    pub airlines: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

fn decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced).map(|v| v.into_owned()).unwrap_or(spaced)
}

/// Returns the first decoded value for `key`.
fn param(query: &str, key: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((k, v)) => Some((k, v)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(k, _)| decode(k) == key)
        .map(|(_, v)| decode(v))
}

fn parse_number(value: Option<String>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok()).filter(|v| v.is_finite())
}

/// Decodes filter parameters, silently dropping values that do not parse.
pub fn parse_filter_params(query: &str) -> ParsedFilterParams {
    let stops = param(query, "stops")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.parse::<StopBucket>().ok())
        .collect();

    let airlines = param(query, "airlines")
        .unwrap_or_default()
        .split(',')
        .map(|a| a.trim().to_uppercase())
        .filter(|a| !a.is_empty())
        .collect();

    ParsedFilterParams {
        stops,
        airlines,
        price_min: parse_number(param(query, "priceMin")),
        price_max: parse_number(param(query, "priceMax")),
    }
}

/// Builds a filter state from a query string, clamping prices to `bounds`.
///
/// A missing price end defaults to the matching bound.
pub fn build_filters(query: &str, bounds: PriceBounds) -> FiltersState {
    let parsed = parse_filter_params(query);
    let range = (parsed.price_min.unwrap_or(bounds.min), parsed.price_max.unwrap_or(bounds.max));

    FiltersState::new(parsed.stops, parsed.airlines, range, bounds)
}

/// Encodes a filter state, omitting values that equal the defaults for `bounds`.
pub fn write_filter_params(filters: &FiltersState, bounds: PriceBounds) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if !filters.stops.is_empty() {
        let codes: Vec<String> = filters.stops.iter().map(|s| s.code().to_string()).collect();
        params.push(("stops", codes.join(",")));
    }

    if !filters.airlines.is_empty() {
        params.push(("airlines", filters.airlines.iter().cloned().collect::<Vec<_>>().join(",")));
    }

    let (min, max) = filters.price_range;
    if min > bounds.min {
        params.push(("priceMin", format!("{}", min.round() as i64)));
    }
    if max < bounds.max {
        params.push(("priceMax", format!("{}", max.round() as i64)));
    }

    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
