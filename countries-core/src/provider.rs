use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, model::CurrentWeather};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Current weather keyed by a city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError>;
}
