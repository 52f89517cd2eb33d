//! Output formatting for offers, locations and price trends (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::flights::time::{format_currency, format_date, format_duration, format_stops, format_time};
use crate::flights::{FlightItinerary, FlightOffer, FlightOffersResponse, LocationOption};
use crate::sort::total_duration_minutes;
use crate::trend::TrendDatum;
use serde::Serialize;

/// Width of the longest trend bar in table output.
const CHART_WIDTH: usize = 24;

/// Formats search results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats offers, resolving carrier names through the response dictionary.
    pub fn format_offers(&self, response: &FlightOffersResponse) -> String {
        let offers = &response.offers;
        if offers.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.offers_csv_header(),
                _ => "No flights found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => to_json(offers, "[]"),
            OutputFormat::Table => self.table_offers(response),
            OutputFormat::Markdown => self.markdown_offers(response),
            OutputFormat::Csv => self.csv_offers(offers),
        }
    }

    /// Formats offers followed by the optional trend.
    ///
    /// JSON output is a single object so it stays machine-readable.
    pub fn format_report(
        &self,
        response: &FlightOffersResponse,
        trend: Option<&[TrendDatum]>,
        default_currency: &str,
    ) -> String {
        let Some(trend) = trend else {
            return self.format_offers(response);
        };

        match self.format {
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct Report<'a> {
                    offers: &'a [FlightOffer],
                    carriers: &'a std::collections::BTreeMap<String, String>,
                    trend: &'a [TrendDatum],
                }

                to_json(
                    &Report { offers: &response.offers, carriers: &response.carriers, trend },
                    "{}",
                )
            }
            _ => {
                let currency = response
                    .offers
                    .first()
                    .map(|o| o.price.currency.as_str())
                    .unwrap_or(default_currency);
                format!("{}\n\n{}", self.format_offers(response), self.format_trend(trend, currency))
            }
        }
    }

    /// Formats a price trend.
    pub fn format_trend(&self, trend: &[TrendDatum], currency: &str) -> String {
        if trend.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => "date,label,outbound,return".to_string(),
                _ => "No price trend available.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => to_json(trend, "[]"),
            OutputFormat::Table => self.table_trend(trend, currency),
            OutputFormat::Markdown => self.markdown_trend(trend, currency),
            OutputFormat::Csv => self.csv_trend(trend),
        }
    }

    /// Formats location suggestions.
    pub fn format_locations(&self, locations: &[LocationOption]) -> String {
        if locations.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.locations_csv_header(),
                _ => "No locations found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => to_json(locations, "[]"),
            OutputFormat::Table => self.table_locations(locations),
            OutputFormat::Markdown => self.markdown_locations(locations),
            OutputFormat::Csv => self.csv_locations(locations),
        }
    }

    // Table formatting

    fn table_offers(&self, response: &FlightOffersResponse) -> String {
        let num_width = 3;
        let price_width = 10;
        let stops_width = 8;
        let duration_width = 8;
        let airline_width = 24;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<num_width$}  {:>price_width$}  {:<stops_width$}  {:<duration_width$}  {:<airline_width$}  {}",
            "#", "Price", "Stops", "Duration", "Airlines", "Itinerary"
        ));
        lines.push(format!(
            "{:-<num_width$}  {:-<price_width$}  {:-<stops_width$}  {:-<duration_width$}  {:-<airline_width$}  {:-<36}",
            "", "", "", "", "", ""
        ));

        for (index, offer) in response.offers.iter().enumerate() {
            let airlines = truncate(&airline_names(response, offer), airline_width);
            let mut legs = offer.itineraries.iter().map(describe_leg);

            lines.push(format!(
                "{:<num_width$}  {:>price_width$}  {:<stops_width$}  {:<duration_width$}  {:<airline_width$}  {}",
                index + 1,
                format_currency(offer.price.total, &offer.price.currency),
                format_stops(offer.stops_count),
                format_duration(total_duration_minutes(offer) as u32),
                airlines,
                legs.next().unwrap_or_default()
            ));

            // Return legs line up under the itinerary column
            let indent = num_width + price_width + stops_width + duration_width + airline_width + 10;
            for leg in legs {
                lines.push(format!("{:indent$}{}", "", leg));
            }
        }

        lines.push(String::new());
        lines.push(format!("Total: {} offers", response.offers.len()));

        lines.join("\n")
    }

    fn table_trend(&self, trend: &[TrendDatum], currency: &str) -> String {
        let peak = trend
            .iter()
            .flat_map(|d| [d.outbound, d.return_leg])
            .flatten()
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        lines.push(format!("{:<7}  {:>9}  {:>9}  {}", "Date", "Outbound", "Return", "Chart"));
        lines.push(format!("{:-<7}  {:-<9}  {:-<9}  {:-<w$}", "", "", "", "", w = CHART_WIDTH));

        for datum in trend {
            let mut chart = bar(datum.outbound, peak, '#');
            if datum.return_leg.is_some() {
                if !chart.is_empty() {
                    chart.push(' ');
                }
                chart.push_str(&bar(datum.return_leg, peak, '='));
            }

            lines.push(format!(
                "{:<7}  {:>9}  {:>9}  {}",
                datum.label,
                price_or_dash(datum.outbound, currency),
                price_or_dash(datum.return_leg, currency),
                chart
            ));
        }

        lines.push(String::new());
        lines.push("Estimated prices around the selected dates.".to_string());

        lines.join("\n")
    }

    fn table_locations(&self, locations: &[LocationOption]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{:<4}  {:<7}  {:<30}  {:<20}  {}", "IATA", "Type", "Name", "City", "Country"));
        lines.push(format!("{:-<4}  {:-<7}  {:-<30}  {:-<20}  {:-<20}", "", "", "", "", ""));

        for location in locations {
            lines.push(format!(
                "{:<4}  {:<7}  {:<30}  {:<20}  {}",
                location.iata,
                location.sub_type.to_string(),
                truncate(&location.name, 30),
                truncate(&location.city, 20),
                location.country
            ));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_offers(&self, response: &FlightOffersResponse) -> String {
        let mut lines = Vec::new();

        lines.push("| # | Price | Stops | Duration | Airlines | Outbound | Return |".to_string());
        lines.push("|---|-------|-------|----------|----------|----------|--------|".to_string());

        for (index, offer) in response.offers.iter().enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} | {} |",
                index + 1,
                format_currency(offer.price.total, &offer.price.currency),
                format_stops(offer.stops_count),
                format_duration(total_duration_minutes(offer) as u32),
                airline_names(response, offer),
                offer.outbound().map(describe_leg).unwrap_or_default(),
                offer.inbound().map(describe_leg).unwrap_or_default()
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} offers found*", response.offers.len()));

        lines.join("\n")
    }

    fn markdown_trend(&self, trend: &[TrendDatum], currency: &str) -> String {
        let mut lines = Vec::new();

        lines.push("| Date | Outbound | Return |".to_string());
        lines.push("|------|----------|--------|".to_string());

        for datum in trend {
            lines.push(format!(
                "| {} | {} | {} |",
                datum.label,
                price_or_dash(datum.outbound, currency),
                price_or_dash(datum.return_leg, currency)
            ));
        }

        lines.join("\n")
    }

    fn markdown_locations(&self, locations: &[LocationOption]) -> String {
        let mut lines = Vec::new();

        lines.push("| IATA | Type | Name | City | Country |".to_string());
        lines.push("|------|------|------|------|---------|".to_string());

        for location in locations {
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                location.iata, location.sub_type, location.name, location.city, location.country
            ));
        }

        lines.join("\n")
    }

    // CSV formatting

    fn offers_csv_header(&self) -> String {
        "id,price,currency,stops,duration_minutes,airlines,outbound,return".to_string()
    }

    fn csv_offers(&self, offers: &[FlightOffer]) -> String {
        let mut lines = Vec::new();
        lines.push(self.offers_csv_header());

        for offer in offers {
            lines.push(format!(
                "{},{},{},{},{},{},{},{}",
                Self::csv_escape(&offer.id),
                offer.price.total,
                offer.price.currency,
                offer.stops_count,
                total_duration_minutes(offer),
                offer.airlines.join(" "),
                Self::csv_escape(&offer.outbound().map(describe_leg).unwrap_or_default()),
                Self::csv_escape(&offer.inbound().map(describe_leg).unwrap_or_default())
            ));
        }

        lines.join("\n")
    }

    fn csv_trend(&self, trend: &[TrendDatum]) -> String {
        let mut lines = vec!["date,label,outbound,return".to_string()];

        for datum in trend {
            lines.push(format!(
                "{},{},{},{}",
                datum.date,
                datum.label,
                datum.outbound.map(|v| v.to_string()).unwrap_or_default(),
                datum.return_leg.map(|v| v.to_string()).unwrap_or_default()
            ));
        }

        lines.join("\n")
    }

    fn locations_csv_header(&self) -> String {
        "iata,sub_type,name,city,country,country_code".to_string()
    }

    fn csv_locations(&self, locations: &[LocationOption]) -> String {
        let mut lines = Vec::new();
        lines.push(self.locations_csv_header());

        for location in locations {
            lines.push(format!(
                "{},{},{},{},{},{}",
                location.iata,
                location.sub_type,
                Self::csv_escape(&location.name),
                Self::csv_escape(&location.city),
                Self::csv_escape(&location.country),
                location.country_code.as_deref().unwrap_or_default()
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

/// `JFK 08:00 → LAX 11:30 (Tue, Mar 10, 5h 30m)`
fn describe_leg(itinerary: &FlightItinerary) -> String {
    match (itinerary.departure(), itinerary.arrival()) {
        (Some(dep), Some(arr)) => format!(
            "{} {} → {} {} ({}, {})",
            dep.iata_code,
            format_time(&dep.at),
            arr.iata_code,
            format_time(&arr.at),
            format_date(&dep.at),
            format_duration(itinerary.duration_minutes)
        ),
        _ => format_duration(itinerary.duration_minutes),
    }
}

fn airline_names(response: &FlightOffersResponse, offer: &FlightOffer) -> String {
    offer.airlines.iter().map(|code| response.carrier_name(code)).collect::<Vec<_>>().join(", ")
}

fn price_or_dash(value: Option<i64>, currency: &str) -> String {
    value.map(|v| format_currency(v as f64, currency)).unwrap_or_else(|| "-".to_string())
}

fn bar(value: Option<i64>, peak: i64, fill: char) -> String {
    match value {
        Some(v) if peak > 0 => {
            let len = ((v.max(0) as f64 / peak as f64) * CHART_WIDTH as f64).round() as usize;
            fill.to_string().repeat(len.max(1))
        }
        _ => String::new(),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
