//! Air-quality provider client: GET {base}/{region} with a static bearer token.
//!
//! Expected body: `{ "pm25": <number|null>, "status": "<label>" }`. Extra fields are ignored.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One reading for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    /// PM2.5 value as sent by the provider; None when the provider reported null.
    pub pm25: Option<serde_json::Number>,
    pub status: String,
}

impl AirQualityReading {
    /// Two-line display text used as the reply card body.
    pub fn display(&self) -> String {
        let pm25 = self
            .pm25
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!("PM2.5：{}\n狀態：{}", pm25, self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AirQualityError {
    #[error("air quality request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("air quality api returned {0}")]
    Status(reqwest::StatusCode),
    #[error("air quality response invalid: {0}")]
    Decode(String),
}

/// Anything that can produce a reading for a region.
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn fetch(&self, region: &str) -> Result<AirQualityReading, AirQualityError>;
}

/// Wire shape; `pm25` must be present but may be null.
#[derive(Debug, Deserialize)]
struct RawReading {
    pm25: serde_json::Value,
    status: String,
}

/// Parse a provider body into a reading.
pub fn parse_reading(body: &[u8]) -> Result<AirQualityReading, AirQualityError> {
    let raw: RawReading =
        serde_json::from_slice(body).map_err(|e| AirQualityError::Decode(e.to_string()))?;
    let pm25 = match raw.pm25 {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => Some(n),
        other => {
            return Err(AirQualityError::Decode(format!(
                "pm25 is not a number: {}",
                other
            )))
        }
    };
    Ok(AirQualityReading {
        pm25,
        status: raw.status,
    })
}

/// HTTP client for the provider. One attempt per call, library default timeouts.
#[derive(Clone)]
pub struct AirQualityClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl AirQualityClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// URL for a region; the region is percent-encoded as a single path segment.
    pub fn region_url(&self, region: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(region))
    }
}

#[async_trait]
impl AirQualitySource for AirQualityClient {
    async fn fetch(&self, region: &str) -> Result<AirQualityReading, AirQualityError> {
        let url = self.region_url(region);
        let mut req = self.client.get(&url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        if res.status() != reqwest::StatusCode::OK {
            return Err(AirQualityError::Status(res.status()));
        }
        let body = res.bytes().await?;
        parse_reading(&body)
    }
}
