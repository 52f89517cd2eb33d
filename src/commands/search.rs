//! Search command implementation.

use crate::amadeus::{parse_flight_offers, AmadeusClient, FlightApi};
use crate::config::Config;
use crate::filters::query::parse_filter_params;
use crate::filters::{apply_filters, price_bounds, FiltersState, PriceBounds, StopBucket};
use crate::flights::{normalize_offers, FlightOffersResponse, SearchRequest};
use crate::format::Formatter;
use crate::sort::{sort_offers_weighted, SortMode};
use crate::trend::{build_price_trend, TrendDatum};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Filtering and presentation options layered on top of a search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub stops: Vec<StopBucket>,
    pub airlines: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    /// Encoded filter query (`stops=0,1&airlines=AA`), merged with the fields above
    pub filters: Option<String>,
    /// Overrides the configured sort
    pub sort: Option<SortMode>,
    pub trend: bool,
}

/// Everything the pipeline derived from one response.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Filtered, sorted and truncated offers with the carrier dictionary
    pub response: FlightOffersResponse,
    pub bounds: PriceBounds,
    pub filters: FiltersState,
    /// Offer count before filtering
    pub total: usize,
    /// Offer count after filtering, before truncation
    pub matched: usize,
    pub trend: Option<Vec<TrendDatum>>,
}

/// Executes a flight search.
pub struct SearchCommand {
    config: Config,
    options: SearchOptions,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config, options: SearchOptions) -> Self {
        Self { config, options }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, request: &SearchRequest) -> Result<String> {
        let client = AmadeusClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, request).await
    }

    /// Executes the search with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl FlightApi,
        request: &SearchRequest,
    ) -> Result<String> {
        let search = request.validate()?;
        info!(
            "Searching {} -> {} ({}{})",
            search.origin,
            search.destination,
            search.depart_str(),
            search.return_str().map(|r| format!(" / {}", r)).unwrap_or_default()
        );

        let body = client.search_offers(&search).await?;
        let outcome = self.process(&body, &search.depart_str(), search.return_str().as_deref())?;

        Ok(self.render(&outcome))
    }

    /// Runs the pipeline over a saved response body instead of the API.
    pub fn execute_from_payload(&self, body: &str, request: &SearchRequest) -> Result<String> {
        let search = request.validate()?;
        let outcome = self.process(body, &search.depart_str(), search.return_str().as_deref())?;

        Ok(self.render(&outcome))
    }

    /// Validates, normalizes, filters, sorts and (optionally) builds the trend.
    pub fn process(
        &self,
        body: &str,
        depart_date: &str,
        return_date: Option<&str>,
    ) -> Result<SearchOutcome> {
        let raw = parse_flight_offers(body)?;
        let normalized = normalize_offers(&raw);
        let total = normalized.count();

        let bounds = price_bounds(&normalized.offers);
        let filters = self.filters_state(bounds);

        let chain = filters.to_chain();
        if !filters.is_unrestricted() {
            debug!("Active filters: {}", chain.descriptions().join(", "));
        }

        let filtered = apply_filters(&normalized.offers, &filters);
        let matched = filtered.len();
        info!("Found {} offers ({} after filtering)", total, matched);

        // Trend follows the filters but not the ordering
        let trend = self
            .options
            .trend
            .then(|| build_price_trend(&filtered, depart_date, return_date));

        let sort = self.options.sort.unwrap_or(self.config.sort);
        let mut offers = sort_offers_weighted(&filtered, sort, self.config.weights);
        offers.truncate(self.config.max_results);

        Ok(SearchOutcome {
            response: FlightOffersResponse { offers, carriers: normalized.carriers },
            bounds,
            filters,
            total,
            matched,
            trend,
        })
    }

    /// Merges the encoded filter query with explicit options; explicit prices win.
    fn filters_state(&self, bounds: PriceBounds) -> FiltersState {
        let parsed = self.options.filters.as_deref().map(parse_filter_params).unwrap_or_default();

        let stops = parsed.stops.into_iter().chain(self.options.stops.iter().copied());
        let airlines = parsed.airlines.into_iter().chain(self.options.airlines.iter().cloned());

        let min = self.options.price_min.or(parsed.price_min).unwrap_or(bounds.min);
        let max = self.options.price_max.or(parsed.price_max).unwrap_or(bounds.max);

        FiltersState::new(stops, airlines, (min, max), bounds)
    }

    fn render(&self, outcome: &SearchOutcome) -> String {
        let formatter = Formatter::new(self.config.format);
        formatter.format_report(&outcome.response, outcome.trend.as_deref(), &self.config.currency)
    }
}
