//! Stop-count bucket filter.

use super::Filter;
use crate::flights::time::format_stops;
use crate::flights::FlightOffer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// UI grouping of stop counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBucket {
    /// Exactly zero stops
    Nonstop,
    /// Exactly one stop
    OneStop,
    /// Two or more stops
    TwoPlus,
}

impl StopBucket {
    /// Returns true if `stops` falls in this bucket.
    pub fn matches(&self, stops: u32) -> bool {
        match self {
            StopBucket::Nonstop => stops == 0,
            StopBucket::OneStop => stops == 1,
            StopBucket::TwoPlus => stops >= 2,
        }
    }

    /// Query-string code: 0, 1 or 2.
    pub fn code(&self) -> u8 {
        match self {
            StopBucket::Nonstop => 0,
            StopBucket::OneStop => 1,
            StopBucket::TwoPlus => 2,
        }
    }
}

impl TryFrom<u8> for StopBucket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StopBucket::Nonstop),
            1 => Ok(StopBucket::OneStop),
            2 => Ok(StopBucket::TwoPlus),
            _ => Err(format!("Unknown stop bucket: {}. Use: 0, 1, 2", value)),
        }
    }
}

impl From<StopBucket> for u8 {
    fn from(bucket: StopBucket) -> Self {
        bucket.code()
    }
}

impl std::str::FromStr for StopBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 =
            s.trim().parse().map_err(|_| format!("Unknown stop bucket: {}. Use: 0, 1, 2", s))?;
        StopBucket::try_from(code)
    }
}

impl fmt::Display for StopBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopBucket::TwoPlus => write!(f, "2+ stops"),
            other => write!(f, "{}", format_stops(other.code() as u32)),
        }
    }
}

/// Passes offers whose stop count falls in any selected bucket.
pub struct StopsFilter {
    buckets: BTreeSet<StopBucket>,
}

impl StopsFilter {
    /// Creates a new stops filter.
    pub fn new(buckets: impl IntoIterator<Item = StopBucket>) -> Self {
        Self { buckets: buckets.into_iter().collect() }
    }
}

impl Filter for StopsFilter {
    fn matches(&self, offer: &FlightOffer) -> bool {
        // No buckets selected means no restriction
        if self.buckets.is_empty() {
            return true;
        }

        self.buckets.iter().any(|b| b.matches(offer.stops_count))
    }

    fn description(&self) -> String {
        if self.buckets.is_empty() {
            return "Stops: any".to_string();
        }

        let labels: Vec<String> = self.buckets.iter().map(ToString::to_string).collect();
        format!("Stops: {}", labels.join(", "))
    }
}
