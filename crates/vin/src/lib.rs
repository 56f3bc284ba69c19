//! `vin` crate — NHTSA VIN decoding client.
//!
//! Decoding is advisory enrichment for vehicle create/update flows. Any
//! failure (network, upstream status, malformed payload, unknown VIN) is
//! logged and reported as "no data" — it never fails the owning operation.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

const NHTSA_BASE_URL: &str = "https://vpic.nhtsa.dot.gov/api/vehicles/DecodeVinValuesExtended";

const DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Normalized vehicle data decoded from a VIN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VinData {
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub engine: Option<String>,
}

/// Client for the NHTSA `DecodeVinValuesExtended` endpoint.
#[derive(Clone)]
pub struct VinDecoder {
    client: reqwest::Client,
    base_url: String,
}

impl VinDecoder {
    pub fn new() -> Self {
        Self::with_base_url(NHTSA_BASE_URL)
    }

    /// Point the decoder at a different endpoint (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DECODE_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Decode a VIN, returning `None` when no enrichment data is available
    /// for any reason.
    pub async fn decode(&self, vin: &str) -> Option<VinData> {
        match self.try_decode(vin).await {
            Ok(data) => data,
            Err(err) => {
                warn!("VIN decode failed for {vin}: {err}");
                None
            }
        }
    }

    async fn try_decode(&self, vin: &str) -> Result<Option<VinData>, reqwest::Error> {
        let url = format!("{}/{}?format=json", self.base_url, vin);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: DecodeResponse = response.json().await?;

        Ok(body.results.into_iter().next().map(VinData::from))
    }
}

impl Default for VinDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    #[serde(rename = "Results", default)]
    results: Vec<RawResult>,
}

/// One raw result entry from the vPIC payload. The upstream reports
/// missing values as empty strings.
#[derive(Debug, Default, Deserialize)]
struct RawResult {
    #[serde(rename = "ModelYear", default)]
    model_year: Option<String>,
    #[serde(rename = "Make", default)]
    make: Option<String>,
    #[serde(rename = "Model", default)]
    model: Option<String>,
    #[serde(rename = "Trim", default)]
    trim: Option<String>,
    #[serde(rename = "EngineModel", default)]
    engine_model: Option<String>,
    #[serde(rename = "EngineConfiguration", default)]
    engine_configuration: Option<String>,
}

impl From<RawResult> for VinData {
    fn from(raw: RawResult) -> Self {
        VinData {
            year: raw.model_year.as_deref().and_then(|y| y.parse().ok()),
            make: non_empty(raw.make),
            model: non_empty(raw.model),
            trim: non_empty(raw.trim),
            engine: non_empty(raw.engine_model).or_else(|| non_empty(raw.engine_configuration)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
