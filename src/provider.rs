//! Radiation forecast provider client (Solcast-compatible API).
//!
//! Pure I/O adapter: builds the request, classifies failures, and maps the
//! wire format into [`IrradianceSample`]s. A structurally valid response
//! with a missing field fails the whole fetch rather than dropping points.

use chrono::{DateTime, FixedOffset};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::domain::IrradianceSample;
use crate::error::ProviderError;

#[derive(Clone)]
pub struct RadiationClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    retry_attempts: u32,
    retry_backoff: std::time::Duration,
}

impl RadiationClient {
    pub fn new(cfg: &ProviderConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("solar-forecast/0.1"));
        let client = reqwest::Client::builder()
            .timeout(cfg.http_timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            client,
            retry_attempts: cfg.retry_attempts,
            retry_backoff: cfg.retry_backoff(),
        })
    }

    /// Fetch the irradiance forecast for a coordinate. Transport and 5xx
    /// failures are retried with exponential backoff up to the configured
    /// attempt budget; everything else surfaces immediately.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<IrradianceSample>, ProviderError> {
        debug_assert!((-90.0..=90.0).contains(&latitude));
        debug_assert!((-180.0..=180.0).contains(&longitude));

        let mut attempt = 0u32;
        loop {
            match self.fetch_once(latitude, longitude).await {
                Ok(samples) => return Ok(samples),
                Err(e) if attempt < self.retry_attempts && e.is_retryable() => {
                    let delay = self.retry_backoff * 2u32.saturating_pow(attempt);
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64,
                        "provider fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<IrradianceSample>, ProviderError> {
        let url = format!("{}/radiation/forecasts", self.base_url);
        debug!(%url, latitude, longitude, "fetching radiation forecast");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status, body });
        }

        let raw: RadiationResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(raw
            .forecasts
            .into_iter()
            .map(|f| IrradianceSample {
                period_end: f.period_end.into(),
                ghi: f.ghi,
                dni: f.dni,
                dhi: f.dhi,
                air_temp: f.air_temp,
                cloud_opacity: f.cloud_opacity,
            })
            .collect())
    }
}

// Wire format. Every field is required; serde rejects entries with any of
// them missing, which fails the fetch as a whole.
#[derive(Debug, Deserialize)]
struct RadiationResponse {
    forecasts: Vec<RawForecast>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    period_end: DateTime<FixedOffset>,
    ghi: f64,
    dni: f64,
    dhi: f64,
    air_temp: f64,
    cloud_opacity: f64,
}
