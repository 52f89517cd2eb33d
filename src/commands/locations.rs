//! Location lookup command implementation.

use crate::amadeus::client::validate_keyword;
use crate::amadeus::{parse_locations, AmadeusClient, FlightApi};
use crate::config::Config;
use crate::flights::normalize_locations;
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::info;

/// Looks up airports and cities for a keyword.
pub struct LocationsCommand {
    config: Config,
}

impl LocationsCommand {
    /// Creates a new locations command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the lookup and returns formatted output.
    pub async fn execute(&self, keyword: &str) -> Result<String> {
        let client = AmadeusClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, keyword).await
    }

    /// Executes the lookup with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl FlightApi, keyword: &str) -> Result<String> {
        let keyword = validate_keyword(keyword)?;

        let body = client.search_locations(keyword).await?;
        let raw = parse_locations(&body)?;
        let locations = normalize_locations(&raw);

        info!("Found {} locations for '{}'", locations.len(), keyword);

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_locations(&locations))
    }
}
