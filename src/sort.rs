//! Offer ordering: cheapest, fastest, or a weighted "best" score.

use crate::flights::FlightOffer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How to order search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Weighted blend of price and duration
    #[default]
    Best,
    Cheapest,
    Fastest,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best" => Ok(SortMode::Best),
            "cheapest" | "price" => Ok(SortMode::Cheapest),
            "fastest" | "duration" => Ok(SortMode::Fastest),
            _ => Err(format!("Unknown sort: {}. Use: best, cheapest, fastest", s)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Best => write!(f, "best"),
            SortMode::Cheapest => write!(f, "cheapest"),
            SortMode::Fastest => write!(f, "fastest"),
        }
    }
}

/// Weights for the "best" score. Tunable; the defaults favour price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_duration_weight")]
    pub duration: f64,
}

fn default_price_weight() -> f64 {
    0.65
}

fn default_duration_weight() -> f64 {
    0.35
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { price: default_price_weight(), duration: default_duration_weight() }
    }
}

/// Sum of every itinerary's duration.
pub fn total_duration_minutes(offer: &FlightOffer) -> u64 {
    offer.itineraries.iter().map(|it| it.duration_minutes as u64).sum()
}

/// Linear min-max scale; a zero range counts as 1.
struct Scale {
    min: f64,
    range: f64,
}

impl Scale {
    fn over(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let range = max - min;
        Self { min, range: if range > 0.0 { range } else { 1.0 } }
    }

    fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.range
    }
}

/// Sorts with the default score weights.
pub fn sort_offers(offers: &[FlightOffer], mode: SortMode) -> Vec<FlightOffer> {
    sort_offers_weighted(offers, mode, ScoreWeights::default())
}

/// Returns a new, stably sorted list of offers.
pub fn sort_offers_weighted(
    offers: &[FlightOffer],
    mode: SortMode,
    weights: ScoreWeights,
) -> Vec<FlightOffer> {
    let mut sorted = offers.to_vec();
    if sorted.len() <= 1 {
        return sorted;
    }

    match mode {
        SortMode::Cheapest => {
            sorted.sort_by(|a, b| a.price.total.total_cmp(&b.price.total));
        }
        SortMode::Fastest => {
            sorted.sort_by_key(total_duration_minutes);
        }
        SortMode::Best => {
            let prices = Scale::over(offers.iter().map(|o| o.price.total));
            let durations = Scale::over(offers.iter().map(|o| total_duration_minutes(o) as f64));

            let score = |offer: &FlightOffer| {
                prices.normalize(offer.price.total) * weights.price
                    + durations.normalize(total_duration_minutes(offer) as f64) * weights.duration
            };

            sorted.sort_by(|a, b| score(a).partial_cmp(&score(b)).unwrap_or(Ordering::Equal));
        }
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::{FlightItinerary, OfferPrice};

    fn make_offer(id: &str, price: f64, durations: &[u32]) -> FlightOffer {
        FlightOffer {
            id: id.to_string(),
            price: OfferPrice::new(price, "USD"),
            itineraries: durations
                .iter()
                .map(|&d| FlightItinerary { duration_minutes: d, segments: Vec::new() })
                .collect(),
            stops_count: 0,
            airlines: vec!["AA".to_string()],
        }
    }

    fn ids(offers: &[FlightOffer]) -> Vec<&str> {
        offers.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("best".parse::<SortMode>().unwrap(), SortMode::Best);
        assert_eq!("CHEAPEST".parse::<SortMode>().unwrap(), SortMode::Cheapest);
        assert_eq!("price".parse::<SortMode>().unwrap(), SortMode::Cheapest);
        assert_eq!("Fastest".parse::<SortMode>().unwrap(), SortMode::Fastest);

        let err = "random".parse::<SortMode>().unwrap_err();
        assert!(err.contains("best, cheapest, fastest"));
    }

    #[test]
    fn test_sort_mode_display_and_default() {
        assert_eq!(SortMode::default(), SortMode::Best);
        assert_eq!(SortMode::Cheapest.to_string(), "cheapest");
        assert_eq!(SortMode::Fastest.to_string(), "fastest");
        assert_eq!(SortMode::Best.to_string(), "best");
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(total_duration_minutes(&make_offer("A", 1.0, &[300, 320])), 620);
        assert_eq!(total_duration_minutes(&make_offer("A", 1.0, &[])), 0);
    }

    #[test]
    fn test_cheapest() {
        let offers = vec![
            make_offer("A", 450.0, &[300]),
            make_offer("B", 120.5, &[600]),
            make_offer("C", 300.0, &[200]),
        ];
        let sorted = sort_offers(&offers, SortMode::Cheapest);
        assert_eq!(ids(&sorted), vec!["B", "C", "A"]);
        assert!(sorted.windows(2).all(|w| w[0].price.total <= w[1].price.total));
    }

    #[test]
    fn test_fastest_sums_itineraries() {
        let offers = vec![
            make_offer("A", 100.0, &[300, 300]),
            make_offer("B", 100.0, &[250, 250]),
            make_offer("C", 100.0, &[700]),
        ];
        assert_eq!(ids(&sort_offers(&offers, SortMode::Fastest)), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_best_blends_price_and_duration() {
        // A: cheapest but slowest, B: fastest but priciest, C: middle of both
        let offers = vec![
            make_offer("A", 100.0, &[600]),
            make_offer("B", 300.0, &[200]),
            make_offer("C", 150.0, &[300]),
        ];
        // Scores: A = 0.35, B = 0.65, C = 0.1625 + 0.0875 = 0.25
        assert_eq!(ids(&sort_offers(&offers, SortMode::Best)), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_best_with_custom_weights() {
        let offers = vec![make_offer("A", 100.0, &[600]), make_offer("B", 300.0, &[200])];
        let weights = ScoreWeights { price: 0.1, duration: 0.9 };
        assert_eq!(ids(&sort_offers_weighted(&offers, SortMode::Best, weights)), vec!["B", "A"]);
    }

    #[test]
    fn test_best_degenerate_ranges() {
        let offers = vec![make_offer("A", 200.0, &[0]), make_offer("B", 200.0, &[0])];
        let sorted = sort_offers(&offers, SortMode::Best);
        assert_eq!(sorted.len(), 2);
        assert!(sorted.iter().all(|o| o.price.total == 200.0));
    }

    #[test]
    fn test_returns_new_sequence() {
        let offers = vec![make_offer("A", 100.0, &[100]), make_offer("B", 200.0, &[200])];
        let sorted = sort_offers(&offers, SortMode::Cheapest);
        assert_eq!(sorted, offers);
        assert_ne!(sorted.as_ptr(), offers.as_ptr());
    }

    #[test]
    fn test_small_inputs() {
        assert!(sort_offers(&[], SortMode::Best).is_empty());

        let single = vec![make_offer("A", 100.0, &[100])];
        assert_eq!(sort_offers(&single, SortMode::Fastest), single);
    }

    #[test]
    fn test_weights_serde_defaults() {
        let weights: ScoreWeights = serde_json::from_str("{}").unwrap();
        assert_eq!(weights, ScoreWeights::default());

        let weights: ScoreWeights = serde_json::from_str(r#"{"price": 0.5}"#).unwrap();
        assert_eq!(weights.price, 0.5);
        assert_eq!(weights.duration, 0.35);
    }
}
