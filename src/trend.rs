//! Synthetic daily price trend around the travel dates.
//!
//! The series is a deterministic visual approximation derived from the cheapest
//! offer. It never touches the network and repeated calls give identical output.

use crate::flights::FlightOffer;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One chart point. A leg with no data on this date is `None`, not zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendDatum {
    pub date: NaiveDate,
    /// Short display label, e.g. `Jan 5`
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<i64>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_leg: Option<i64>,
}

/// Shape of the generated curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendParams {
    /// Days on each side of the anchor date
    pub window_days: u32,
    /// Fraction of the cheapest fare attributed to the outbound leg of a round trip
    pub outbound_share: f64,
    pub return_share: f64,
    /// Maximum relative noise applied to each point
    pub variance_band: f64,
    /// Lower bound for the edge-of-window markup
    pub min_spread: f64,
    pub spread_ratio: f64,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            window_days: 3,
            outbound_share: 0.55,
            return_share: 0.45,
            variance_band: 0.04,
            min_spread: 25.0,
            spread_ratio: 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Leg {
    Outbound,
    Return,
}

impl Leg {
    fn as_str(&self) -> &'static str {
        match self {
            Leg::Outbound => "outbound",
            Leg::Return => "return",
        }
    }
}

/// Stable pseudo-random value in `[-1, 1]` for a key.
///
/// Steps are 0.25 wide. The hash runs over UTF-16 code units.
pub fn seeded_variance(key: &str) -> f64 {
    let hash = key.encode_utf16().fold(0u32, |h, unit| (h * 31 + unit as u32) % 997);
    ((hash % 9) as f64 - 4.0) / 4.0
}

fn parse_anchor(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

fn format_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Consecutive dates centred on `anchor`.
fn build_window(anchor: NaiveDate, days: u32) -> Vec<NaiveDate> {
    let days = days as i64;
    (-days..=days).filter_map(|offset| anchor.checked_add_signed(Duration::days(offset))).collect()
}

fn compute_series(
    dates: &[NaiveDate],
    base: f64,
    leg: Leg,
    params: &TrendParams,
) -> BTreeMap<NaiveDate, i64> {
    let center = dates.len() / 2;
    let spread = params.min_spread.max(base * params.spread_ratio);

    dates
        .iter()
        .enumerate()
        .map(|(index, date)| {
            let distance = index.abs_diff(center) as f64;
            let key = format!("{}-{}", date.format("%Y-%m-%d"), leg.as_str());
            let variance = seeded_variance(&key) * params.variance_band;
            let trend = base + spread * (distance / center.max(1) as f64);
            (*date, (trend * (1.0 + variance)).round() as i64)
        })
        .collect()
}

/// Builds the trend with the default curve parameters.
pub fn build_price_trend(
    offers: &[FlightOffer],
    depart_date: &str,
    return_date: Option<&str>,
) -> Vec<TrendDatum> {
    build_price_trend_with(offers, depart_date, return_date, &TrendParams::default())
}

/// Builds the merged, chronologically sorted trend for one or two legs.
///
/// Returns an empty list when there are no offers or the depart date is blank.
/// An anchor date that does not parse contributes no points.
pub fn build_price_trend_with(
    offers: &[FlightOffer],
    depart_date: &str,
    return_date: Option<&str>,
    params: &TrendParams,
) -> Vec<TrendDatum> {
    if depart_date.trim().is_empty() || offers.is_empty() {
        return Vec::new();
    }

    let min_price = offers.iter().map(|o| o.price.total).fold(f64::INFINITY, f64::min);
    let return_date = return_date.filter(|d| !d.trim().is_empty());

    let (outbound_base, return_base) = match return_date {
        Some(_) => (min_price * params.outbound_share, min_price * params.return_share),
        None => (min_price, min_price),
    };

    let outbound_dates = parse_anchor(depart_date)
        .map(|d| build_window(d, params.window_days))
        .unwrap_or_default();
    let outbound = compute_series(&outbound_dates, outbound_base, Leg::Outbound, params);

    let return_dates = return_date
        .and_then(parse_anchor)
        .map(|d| build_window(d, params.window_days))
        .unwrap_or_default();
    let inbound = compute_series(&return_dates, return_base, Leg::Return, params);

    let dates: BTreeSet<NaiveDate> = outbound_dates.into_iter().chain(return_dates).collect();

    dates
        .into_iter()
        .map(|date| TrendDatum {
            date,
            label: format_label(date),
            outbound: outbound.get(&date).copied(),
            return_leg: inbound.get(&date).copied(),
        })
        .collect()
}
