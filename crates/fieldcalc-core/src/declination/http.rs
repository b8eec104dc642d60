//! HTTP declination provider.
//!
//! Queries a geomagnetic model web service (NOAA-style JSON response) and
//! answers `None` on any transport or parse failure, letting the resolver
//! fall through to the next provider.

use crate::declination::DeclinationProvider;
use async_trait::async_trait;
use std::time::Duration;

const NOAA_ENDPOINT: &str =
    "https://www.ngdc.noaa.gov/geomag-web/calculators/calculateDeclination";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpProvider {
    name: String,
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
            client,
        }
    }

    /// NOAA geomag calculator endpoint.
    pub fn noaa(api_key: impl Into<String>) -> Self {
        Self::new("noaa", NOAA_ENDPOINT, Some(api_key.into()))
    }
}

#[async_trait]
impl DeclinationProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn declination(&self, lon: f64, lat: f64, decimal_year: f64) -> Option<f64> {
        let mut request = self.client.get(&self.endpoint).query(&[
            ("lat1", lat.to_string()),
            ("lon1", lon.to_string()),
            ("startYear", format!("{}", decimal_year.floor() as i64)),
            ("resultFormat", "json".to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(provider = %self.name, "declination request failed: {}", e);
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(provider = %self.name, status = %response.status(), "declination request rejected");
            return None;
        }

        let body: serde_json::Value = response.json().await.ok()?;
        body.get("result")?.get(0)?.get("declination")?.as_f64()
    }
}
