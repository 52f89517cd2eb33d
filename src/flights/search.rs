//! Flight search parameters and their validation.

use crate::validation::{FieldIssue, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on offers requested from the API.
pub const MAX_UPSTREAM_OFFERS: u32 = 50;

/// Travel class accepted by the flight-offers endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    /// Upstream `travelClass` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "ECONOMY",
            CabinClass::PremiumEconomy => "PREMIUM_ECONOMY",
            CabinClass::Business => "BUSINESS",
            CabinClass::First => "FIRST",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "ECONOMY" => Ok(CabinClass::Economy),
            "PREMIUM_ECONOMY" | "PREMIUM" => Ok(CabinClass::PremiumEconomy),
            "BUSINESS" => Ok(CabinClass::Business),
            "FIRST" => Ok(CabinClass::First),
            _ => Err(format!(
                "Unknown cabin: {}. Use: economy, premium_economy, business, first",
                s
            )),
        }
    }
}

/// Search form state as entered by the user; nothing is trusted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub depart_date: String,
    /// `YYYY-MM-DD`; empty or absent means one-way
    #[serde(default)]
    pub return_date: Option<String>,
    pub adults: u32,
    #[serde(default)]
    pub cabin: Option<CabinClass>,
}

/// A search that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSearch {
    pub origin: String,
    pub destination: String,
    pub depart_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub cabin: Option<CabinClass>,
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn check_iata(field: &str, value: &str, issues: &mut Vec<FieldIssue>) -> String {
    let code = value.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        issues.push(FieldIssue::new(field, "must be a 3-letter IATA code"));
    }
    code
}

impl SearchRequest {
    /// Returns the return date when one was actually entered.
    pub fn return_date(&self) -> Option<&str> {
        self.return_date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Returns true if this is a round trip.
    pub fn is_round_trip(&self) -> bool {
        self.return_date().is_some()
    }

    /// Returns true once origin, destination and dates are filled in.
    ///
    /// Gates whether a search should be triggered at all; field contents are
    /// checked by [`SearchRequest::validate`].
    pub fn is_ready(&self) -> bool {
        !self.origin.trim().is_empty()
            && !self.destination.trim().is_empty()
            && !self.depart_date.trim().is_empty()
    }

    /// Validates every field, reporting all problems together.
    pub fn validate(&self) -> Result<ValidSearch, ValidationError> {
        let mut issues = Vec::new();

        let origin = check_iata("origin", &self.origin, &mut issues);
        let destination = check_iata("destination", &self.destination, &mut issues);

        let depart_date = parse_date(&self.depart_date);
        if depart_date.is_none() {
            issues.push(FieldIssue::new("departDate", "must be a date in YYYY-MM-DD format"));
        }

        let return_date = match self.return_date() {
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    issues
                        .push(FieldIssue::new("returnDate", "must be a date in YYYY-MM-DD format"));
                }
                parsed
            }
            None => None,
        };

        if let (Some(depart), Some(ret)) = (depart_date, return_date) {
            if ret < depart {
                issues.push(FieldIssue::new("returnDate", "must not be before departDate"));
            }
        }

        if !(1..=9).contains(&self.adults) {
            issues.push(FieldIssue::new("adults", "must be between 1 and 9"));
        }

        match depart_date {
            Some(depart_date) if issues.is_empty() => Ok(ValidSearch {
                origin,
                destination,
                depart_date,
                return_date,
                adults: self.adults,
                cabin: self.cabin,
            }),
            _ => Err(ValidationError::new("Invalid search parameters", issues)),
        }
    }
}

impl ValidSearch {
    /// Builds the flight-offers query string.
    pub fn to_query(&self) -> String {
        let mut params = vec![
            ("originLocationCode", self.origin.clone()),
            ("destinationLocationCode", self.destination.clone()),
            ("departureDate", self.depart_date.to_string()),
            ("adults", self.adults.to_string()),
            ("max", MAX_UPSTREAM_OFFERS.to_string()),
        ];

        if let Some(ret) = self.return_date {
            params.push(("returnDate", ret.to_string()));
        }

        if let Some(cabin) = self.cabin {
            params.push(("travelClass", cabin.as_str().to_string()));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Depart date as `YYYY-MM-DD`.
    pub fn depart_str(&self) -> String {
        self.depart_date.format("%Y-%m-%d").to_string()
    }

    /// Return date as `YYYY-MM-DD`, if any.
    pub fn return_str(&self) -> Option<String> {
        self.return_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}
