use crate::{
    Config,
    error::FetchError,
    model::{ForecastPayload, LocationCandidate},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod client;

pub use client::WeatherApiClient;

/// Endpoints the lookup workflow needs from the weather provider.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Free-text city search, used to populate the suggestion list.
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, FetchError>;

    /// Current conditions plus `days` of daily forecast for `city`.
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<ForecastPayload, FetchError>;
}

/// Construct the HTTP client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<WeatherApiClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `citycast configure` or set WEATHERAPI_KEY."
        )
    })?;

    WeatherApiClient::with_base_url(api_key, &config.base_url, config.timeout())
}
