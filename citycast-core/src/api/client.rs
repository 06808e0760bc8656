use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{ForecastPayload, LocationCandidate},
};

use super::WeatherApi;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

const SEARCH_ENDPOINT: &str = "search.json";
const FORECAST_ENDPOINT: &str = "forecast.json";

/// weatherapi.com client over reqwest.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    /// Client against a custom base URL, e.g. a mock server in tests.
    pub fn with_base_url(api_key: &str, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET against `endpoint` and decode the body. Every failure is
    /// logged here so callers only deal with the returned error.
    async fn api_call<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let result = self.send(endpoint, params).await;

        if let Err(err) = &result {
            tracing::warn!(endpoint, error = %err, "weather API call failed");
        }

        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, ?params, "requesting weather API");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|source| FetchError::Network { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Network { endpoint, source })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherApi for WeatherApiClient {
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, FetchError> {
        self.api_call(SEARCH_ENDPOINT, &[("q", query)]).await
    }

    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<ForecastPayload, FetchError> {
        let days = days.to_string();

        self.api_call(
            FORECAST_ENDPOINT,
            &[("q", city), ("days", &days), ("aqi", "no"), ("alerts", "no")],
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
