//! Core library for the `countries` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The country catalog client and the query resolver
//! - Weather providers and the capital weather enricher
//! - The selection state machine and the pipeline that drives it
//!
//! It is used by `countries-cli`, but can also be reused by other front ends.

pub mod catalog;
pub mod config;
pub mod enricher;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod session;
pub mod tasks;

pub use catalog::{CountryCatalog, CountryResolver, Resolution, RestCountriesCatalog};
pub use config::Config;
pub use enricher::WeatherEnricher;
pub use error::FetchError;
pub use model::{Country, CurrentWeather, Reading, WeatherSummary};
pub use pipeline::Pipeline;
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use session::{
    Event, MAX_LISTED, MatchView, Phase, SelectionView, Session, View, WeatherView,
};
