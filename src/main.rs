//! fare-scout - Flight offer search CLI
//!
//! Searches Amadeus flight offers, filters and ranks them, and charts a price trend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fare_scout::amadeus::AmadeusEnv;
use fare_scout::commands::{LocationsCommand, SearchCommand, SearchOptions};
use fare_scout::config::{Config, OutputFormat};
use fare_scout::filters::StopBucket;
use fare_scout::flights::{CabinClass, SearchRequest};
use fare_scout::sort::SortMode;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fare-scout",
    version,
    about = "Flight offer search CLI",
    long_about = "Searches Amadeus flight offers, filters and ranks them, and charts a synthesized price trend."
)]
struct Cli {
    /// Amadeus environment
    #[arg(short, long, global = true)]
    env: Option<AmadeusEnv>,

    /// OAuth2 client id
    #[arg(long, global = true, env = "AMADEUS_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, global = true, env = "AMADEUS_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search flight offers
    #[command(alias = "s")]
    Search {
        /// Origin IATA code
        origin: String,

        /// Destination IATA code
        destination: String,

        /// Departure date (YYYY-MM-DD)
        #[arg(short, long)]
        depart: String,

        /// Return date (YYYY-MM-DD) for a round trip
        #[arg(short, long = "return")]
        return_date: Option<String>,

        /// Number of adult travelers
        #[arg(short, long, default_value = "1")]
        adults: u32,

        /// Travel class (economy, premium_economy, business, first)
        #[arg(long)]
        cabin: Option<CabinClass>,

        /// Stop buckets to keep: 0, 1, 2 (two or more)
        #[arg(long, value_delimiter = ',')]
        stops: Vec<StopBucket>,

        /// Carrier codes to keep (comma-separated)
        #[arg(long, value_delimiter = ',')]
        airlines: Vec<String>,

        /// Minimum price filter
        #[arg(long)]
        price_min: Option<f64>,

        /// Maximum price filter
        #[arg(long)]
        price_max: Option<f64>,

        /// Encoded filters, e.g. "stops=0,1&airlines=AA"
        #[arg(long)]
        filters: Option<String>,

        /// Ordering: best, cheapest, fastest
        #[arg(long)]
        sort: Option<SortMode>,

        /// Append a price trend around the travel dates
        #[arg(long)]
        trend: bool,

        /// Read a saved offers response instead of calling the API
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Look up airports and cities
    #[command(alias = "l")]
    Locations {
        /// City or airport name (at least 2 characters)
        keyword: String,
    },

    /// List API environments
    Envs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(env) = cli.env {
        config.env = env;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(id) = cli.client_id {
        config.client_id = Some(id);
    }
    if let Some(secret) = cli.client_secret {
        config.client_secret = Some(secret);
    }

    match cli.command {
        Commands::Search {
            origin,
            destination,
            depart,
            return_date,
            adults,
            cabin,
            stops,
            airlines,
            price_min,
            price_max,
            filters,
            sort,
            trend,
            input,
            max,
        } => {
            if let Some(max) = max {
                config.max_results = max;
            }

            let request = SearchRequest {
                origin,
                destination,
                depart_date: depart,
                return_date,
                adults,
                cabin,
            };
            let options =
                SearchOptions { stops, airlines, price_min, price_max, filters, sort, trend };

            let cmd = SearchCommand::new(config, options);
            let output = match input {
                Some(path) => {
                    let body = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read offers file: {}", path.display()))?;
                    cmd.execute_from_payload(&body, &request)?
                }
                None => cmd.execute(&request).await?,
            };
            println!("{}", output);
        }

        Commands::Locations { keyword } => {
            let cmd = LocationsCommand::new(config);
            let output = cmd.execute(&keyword).await?;
            println!("{}", output);
        }

        Commands::Envs => {
            println!("Amadeus environments:\n");
            println!("{:<12} {:<28}", "Name", "Base URL");
            println!("{:-<12} {:-<28}", "", "");

            for env in AmadeusEnv::all() {
                let marker = if *env == config.env { " (active)" } else { "" };
                println!("{:<12} {:<28}{}", env.to_string(), env.base_url(), marker);
            }
        }
    }

    Ok(())
}
