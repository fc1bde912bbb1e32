use async_trait::async_trait;
use reqwest::Client;

use crate::{error::FetchError, model::CurrentWeather};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>, url: impl Into<String>, http: Client) -> Self {
        Self {
            api_key: api_key.into(),
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError> {
        tracing::debug!(city, "fetching current weather");

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}
