//! Capital weather lookup for a resolved country.

use std::sync::Arc;

use crate::{
    model::{Country, CurrentWeather, WeatherSummary},
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub struct WeatherEnricher {
    provider: Arc<dyn WeatherProvider>,
    icon_base_url: String,
}

impl WeatherEnricher {
    pub fn new(provider: Arc<dyn WeatherProvider>, icon_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            icon_base_url: icon_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Weather for the country's first capital.
    ///
    /// Returns `None` without a request when there is no country or it has no
    /// capital. Fetch failures are logged and also yield `None`.
    pub async fn enrich(&self, country: Option<&Country>) -> Option<WeatherSummary> {
        let country = country?;
        let Some(capital) = country.primary_capital() else {
            tracing::debug!(country = %country.common_name, "no capital, skipping weather");
            return None;
        };

        match self.provider.current(capital).await {
            Ok(weather) => Some(self.summarize(&weather)),
            Err(err) => {
                tracing::warn!(
                    capital,
                    status = ?err.http_status(),
                    error = %err,
                    "weather fetch failed"
                );
                None
            }
        }
    }

    pub fn summarize(&self, weather: &CurrentWeather) -> WeatherSummary {
        WeatherSummary {
            temperature_celsius: weather.temperature().into(),
            wind_speed_ms: weather.wind_speed().into(),
            icon_url: weather
                .icon_code()
                .map(|code| format!("{}/{code}@2x.png", self.icon_base_url))
                .unwrap_or_default(),
        }
    }
}
