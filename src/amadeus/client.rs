//! HTTP client for the Amadeus self-service APIs.

use crate::amadeus::env::AmadeusEnv;
use crate::amadeus::schema::{parse_error, parse_token};
use crate::amadeus::token::{IssuedToken, TokenCache};
use crate::config::Config;
use crate::flights::ValidSearch;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Minimum keyword length accepted by the location lookup.
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Maximum suggestions requested per lookup.
pub const LOCATION_PAGE_LIMIT: u32 = 12;

/// Trait for flight and location lookups - enables mocking for tests.
#[async_trait]
pub trait FlightApi: Send + Sync {
    /// Searches flight offers and returns the raw JSON body.
    async fn search_offers(&self, search: &ValidSearch) -> Result<String>;

    /// Looks up airports and cities by keyword and returns the raw JSON body.
    async fn search_locations(&self, keyword: &str) -> Result<String>;
}

/// Returns the trimmed keyword, or an error if it is too short to look up.
pub fn validate_keyword(keyword: &str) -> Result<&str> {
    let keyword = keyword.trim();
    if keyword.chars().count() < MIN_KEYWORD_CHARS {
        anyhow::bail!("Keyword must be at least {} characters", MIN_KEYWORD_CHARS);
    }
    Ok(keyword)
}

/// Builds the location lookup query string.
pub fn locations_query(keyword: &str) -> String {
    let limit = LOCATION_PAGE_LIMIT.to_string();
    let params = [
        ("keyword", keyword),
        ("subType", "AIRPORT,CITY"),
        ("view", "LIGHT"),
        ("page[limit]", limit.as_str()),
    ];

    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Amadeus client with token caching and rate-limit retries.
pub struct AmadeusClient {
    client: Client,
    env: AmadeusEnv,
    base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    tokens: TokenCache,
    max_retries: u32,
    retry_base_ms: u64,
}

impl AmadeusClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, config.host.clone())
    }

    /// Creates a new client with an optional custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            env: config.env,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            tokens: TokenCache::new(),
            max_retries: config.max_retries,
            retry_base_ms: config.retry_base_ms,
        })
    }

    /// Returns the base URL (custom override, or environment-based).
    pub fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| self.env.base_url())
    }

    /// Returns the configured environment.
    pub fn env(&self) -> AmadeusEnv {
        self.env
    }

    /// Updates the 429 retry policy.
    pub fn set_retry(&mut self, max_retries: u32, retry_base_ms: u64) {
        self.max_retries = max_retries;
        self.retry_base_ms = retry_base_ms;
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let id = self
            .client_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .context("AMADEUS_CLIENT_ID is not set")?;
        let secret = self
            .client_secret
            .as_deref()
            .filter(|v| !v.is_empty())
            .context("AMADEUS_CLIENT_SECRET is not set")?;
        Ok((id, secret))
    }

    /// Requests a new access token with the client-credentials grant.
    async fn request_token(&self) -> Result<IssuedToken> {
        let (id, secret) = self.credentials()?;
        let url = format!("{}/v1/security/oauth2/token", self.base_url());
        let body = format!(
            "grant_type=client_credentials&client_id={}&client_secret={}",
            urlencoding::encode(id),
            urlencoding::encode(secret)
        );

        info!("Requesting access token ({})", self.env);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await
            .context("Failed to request access token")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read token response")?;

        if !status.is_success() {
            anyhow::bail!("Amadeus token request failed: {} {}", status.as_u16(), text);
        }

        let token = parse_token(&text)?;
        Ok(IssuedToken::new(token.access_token, Duration::from_secs(token.expires_in)))
    }

    async fn access_token(&self) -> Result<String> {
        self.tokens.get(|| self.request_token()).await
    }

    /// Performs an authorized GET, retrying on 429.
    async fn get(&self, path_and_query: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url(), path_and_query);
        let mut attempt = 0;

        loop {
            let token = self.access_token().await?;
            debug!("GET {}", url);

            let response = self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", token))
                .header("Accept", "application/json")
                .send()
                .await
                .context("Failed to send request")?;

            let status = response.status();
            debug!("Response status: {}", status);

            let body = response.text().await.context("Failed to read response body")?;

            if status == 429 && attempt < self.max_retries {
                attempt += 1;
                warn!("Rate limited (429), retry {}/{}", attempt, self.max_retries);
                self.backoff(attempt).await;
                continue;
            }

            if status == 401 {
                self.tokens.invalidate().await;
            }

            if !status.is_success() {
                match parse_error(&body).first_message() {
                    Some(detail) => anyhow::bail!("{} (status {})", detail, status.as_u16()),
                    None => anyhow::bail!("Request failed with status: {}", status),
                }
            }

            return Ok(body);
        }
    }

    /// Exponential backoff with random jitter.
    async fn backoff(&self, attempt: u32) {
        if self.retry_base_ms == 0 {
            return;
        }

        let base = self.retry_base_ms.saturating_mul(1 << (attempt - 1).min(6));
        let jitter = rand::rng().random_range(0..=self.retry_base_ms / 2);

        let total_delay = base + jitter;
        debug!("Backing off {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl FlightApi for AmadeusClient {
    async fn search_offers(&self, search: &ValidSearch) -> Result<String> {
        let path = format!("/v2/shopping/flight-offers?{}", search.to_query());

        info!(
            "Searching flights: {} -> {} on {}",
            search.origin,
            search.destination,
            search.depart_str()
        );
        self.get(&path).await
    }

    async fn search_locations(&self, keyword: &str) -> Result<String> {
        let keyword = validate_keyword(keyword)?;
        let path = format!("/v1/reference-data/locations?{}", locations_query(keyword));

        info!("Looking up locations: {}", keyword);
        self.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::SearchRequest;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = r#"{"access_token":"abc123","expires_in":1799,"token_type":"Bearer"}"#;

    fn make_test_config() -> Config {
        Config {
            client_id: Some("id".to_string()),
            client_secret: Some("s3cret/+".to_string()),
            max_retries: 2,
            retry_base_ms: 0, // No backoff for tests
            ..Config::default()
        }
    }

    fn make_search() -> ValidSearch {
        SearchRequest {
            origin: "jfk".to_string(),
            destination: "LAX".to_string(),
            depart_date: "2026-03-10".to_string(),
            return_date: None,
            adults: 1,
            cabin: None,
        }
        .validate()
        .unwrap()
    }

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v1/security/oauth2/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_validate_keyword() {
        assert_eq!(validate_keyword("  lon ").unwrap(), "lon");
        assert_eq!(validate_keyword("Zü").unwrap(), "Zü");

        let err = validate_keyword(" a ").unwrap_err().to_string();
        assert!(err.contains("at least 2 characters"));
        assert!(validate_keyword("").is_err());
    }

    #[test]
    fn test_locations_query() {
        assert_eq!(
            locations_query("new york"),
            "keyword=new%20york&subType=AIRPORT%2CCITY&view=LIGHT&page%5Blimit%5D=12"
        );
    }

    #[test]
    fn test_base_url_default() {
        let client = AmadeusClient::new(&make_test_config()).unwrap();
        assert_eq!(client.base_url(), "https://test.api.amadeus.com");
        assert_eq!(client.env(), AmadeusEnv::Test);
    }

    #[test]
    fn test_base_url_from_env_and_host() {
        let mut config = make_test_config();
        config.env = AmadeusEnv::Production;
        let client = AmadeusClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.amadeus.com");

        config.host = Some("http://localhost:9000/".to_string());
        let client = AmadeusClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_set_retry() {
        let mut client = AmadeusClient::new(&make_test_config()).unwrap();
        client.set_retry(5, 250);
        assert_eq!(client.max_retries, 5);
        assert_eq!(client.retry_base_ms, 250);
    }

    #[tokio::test]
    async fn test_search_offers_success() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v2/shopping/flight-offers"))
            .and(header("Authorization", "Bearer abc123"))
            .and(query_param("originLocationCode", "JFK"))
            .and(query_param("destinationLocationCode", "LAX"))
            .and(query_param("departureDate", "2026-03-10"))
            .and(query_param("max", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let body = client.search_offers(&make_search()).await.unwrap();
        assert_eq!(body, r#"{"data":[]}"#);
    }

    #[tokio::test]
    async fn test_token_reused_across_requests() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v1/reference-data/locations"))
            .and(query_param("subType", "AIRPORT,CITY"))
            .and(query_param("page[limit]", "12"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        client.search_locations("lon").await.unwrap();
        client.search_locations("par").await.unwrap();
    }

    #[tokio::test]
    async fn test_short_keyword_rejected_without_request() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 0).await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search_locations("x").await.unwrap_err().to_string();
        assert!(err.contains("at least 2 characters"));
    }

    #[tokio::test]
    async fn test_upstream_error_detail() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        let error = r#"{"errors":[{"status":400,"title":"INVALID DATE","detail":"Date/Time is in the past"}]}"#;
        Mock::given(method("GET"))
            .and(path("/v2/shopping/flight-offers"))
            .respond_with(ResponseTemplate::new(400).set_body_string(error))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search_offers(&make_search()).await.unwrap_err().to_string();
        assert!(err.contains("Date/Time is in the past"));
        assert!(err.contains("400"));
    }

    #[tokio::test]
    async fn test_http_error_without_detail() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v2/shopping/flight-offers"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search_offers(&make_search()).await.unwrap_err().to_string();
        assert!(err.contains("500"));
    }

    #[tokio::test]
    async fn test_rate_limit_retried() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v2/shopping/flight-offers"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/shopping/flight-offers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        assert!(client.search_offers(&make_search()).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/v2/shopping/flight-offers"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search_offers(&make_search()).await.unwrap_err().to_string();
        assert!(err.contains("429"));
    }

    #[tokio::test]
    async fn test_token_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/security/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search_offers(&make_search()).await.unwrap_err().to_string();
        assert!(err.contains("token request failed"));
        assert!(err.contains("401"));
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/security/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"expires_in":"soon"}"#))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search_offers(&make_search()).await.unwrap_err().to_string();
        assert!(err.contains("Unexpected response from Amadeus"));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let config = Config { client_id: None, ..make_test_config() };
        let client = AmadeusClient::with_base_url(&config, Some("http://localhost".into())).unwrap();

        let err = client.search_offers(&make_search()).await.unwrap_err().to_string();
        assert!(err.contains("AMADEUS_CLIENT_ID"));
    }

    #[tokio::test]
    async fn test_credentials_form_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/security/oauth2/token"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("client_secret=s3cret%2F%2B"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/reference-data/locations"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
            .mount(&mock_server)
            .await;

        let client =
            AmadeusClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        client.search_locations("nyc").await.unwrap();
    }
}
