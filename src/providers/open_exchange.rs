use crate::core::currency::{RateProvider, is_usable_rate};
use crate::core::error::RateError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// Latest rates from the Open Exchange Rates `latest.json` endpoint.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: Option<String>,
    client: reqwest::Client,
}

impl OpenExchangeRatesProvider {
    pub fn new(base_url: &str, app_id: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xconv/0.1")
            .timeout(timeout)
            .build()?;
        Ok(OpenExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            client,
        })
    }
}

fn request_error(e: reqwest::Error) -> RateError {
    if e.is_timeout() {
        RateError::Network("request timed out".to_string())
    } else {
        // The URL carries the API key
        RateError::Network(e.without_url().to_string())
    }
}

#[async_trait]
impl RateProvider for OpenExchangeRatesProvider {
    #[instrument(name = "OpenExchangeRatesFetch", skip(self))]
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RateError> {
        let app_id = self.app_id.as_deref().ok_or(RateError::MissingApiKey)?;

        let url = format!("{}/latest.json?app_id={}", self.base_url, app_id);
        debug!("Requesting latest rates from {}/latest.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(RateError::Network(format!(
                "API Error: {}",
                response.status()
            )));
        }

        let text = response.text().await.map_err(request_error)?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| RateError::Malformed(format!("Failed to parse JSON response: {e}")))?;

        let mut rates = data
            .rates
            .ok_or_else(|| RateError::Malformed("response has no rates".to_string()))?;
        if rates.is_empty() {
            return Err(RateError::Malformed("response has empty rates".to_string()));
        }

        rates.retain(|code, rate| {
            let usable = is_usable_rate(*rate);
            if !usable {
                warn!("Ignoring unusable rate for {code}: {rate}");
            }
            usable
        });
        if rates.is_empty() {
            return Err(RateError::Malformed(
                "response has no usable rates".to_string(),
            ));
        }

        debug!(base = ?data.base, count = rates.len(), "Received latest rates");
        Ok(rates)
    }

    fn api_key(&self) -> Option<&str> {
        self.app_id.as_deref()
    }
}
