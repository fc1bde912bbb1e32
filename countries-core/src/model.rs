use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// A country record from the catalog.
///
/// Decoded from the REST Countries shape (`name.common`, `capital`, `area`,
/// `languages`, `flags.png`, `cca3`). Optional fields fall back to empty
/// values instead of failing the whole catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawCountry")]
pub struct Country {
    pub common_name: String,
    pub alpha3_code: String,
    pub capitals: Vec<String>,
    pub area_km2: f64,
    /// Language code -> language name.
    pub languages: BTreeMap<String, String>,
    pub flag_image_url: String,
}

impl Country {
    /// First entry of the capital list; the weather lookup key.
    pub fn primary_capital(&self) -> Option<&str> {
        self.capitals.first().map(String::as_str)
    }

    pub fn language_names(&self) -> impl Iterator<Item = &str> {
        self.languages.values().map(String::as_str)
    }

    pub fn name_contains(&self, needle_lower: &str) -> bool {
        self.common_name.to_lowercase().contains(needle_lower)
    }
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawFlags {
    #[serde(default)]
    png: Option<String>,
}

// Every optional field also accepts an explicit `null`.
#[derive(Debug, Deserialize)]
struct RawCountry {
    name: RawName,
    cca3: String,
    #[serde(default)]
    capital: Option<Vec<String>>,
    #[serde(default)]
    area: Option<f64>,
    #[serde(default)]
    languages: Option<BTreeMap<String, String>>,
    #[serde(default)]
    flags: Option<RawFlags>,
}

impl From<RawCountry> for Country {
    fn from(raw: RawCountry) -> Self {
        Self {
            common_name: raw.name.common,
            alpha3_code: raw.cca3,
            capitals: raw.capital.unwrap_or_default(),
            area_km2: raw.area.unwrap_or_default(),
            languages: raw.languages.unwrap_or_default(),
            flag_image_url: raw.flags.and_then(|f| f.png).unwrap_or_default(),
        }
    }
}

/// A numeric weather reading that the provider may have omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Reading {
    Value(f64),
    NotAvailable,
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Reading::NotAvailable, Reading::Value)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{v}"),
            Reading::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// Normalized current weather for a capital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub temperature_celsius: Reading,
    pub wind_speed_ms: Reading,
    /// Empty when the provider sent no icon code.
    pub icon_url: String,
}

impl WeatherSummary {
    pub fn has_icon(&self) -> bool {
        !self.icon_url.is_empty()
    }
}

/// Current-weather payload as sent by the provider. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    main: Option<CwMain>,
    #[serde(default)]
    wind: Option<CwWind>,
    #[serde(default)]
    weather: Option<Vec<CwCondition>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct CwMain {
    temp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct CwWind {
    speed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct CwCondition {
    icon: Option<String>,
}

impl CurrentWeather {
    pub fn temperature(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.temp)
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.wind.as_ref().and_then(|w| w.speed)
    }

    pub fn icon_code(&self) -> Option<&str> {
        self.weather
            .as_deref()
            .and_then(<[CwCondition]>::first)
            .and_then(|c| c.icon.as_deref())
            .filter(|code| !code.is_empty())
    }
}
