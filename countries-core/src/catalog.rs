//! Country catalog access and the query resolver.

use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

use crate::{error::FetchError, model::Country};

/// Source of the full, unpaginated country list.
#[async_trait]
pub trait CountryCatalog: Send + Sync + Debug {
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError>;
}

/// Catalog served by the REST Countries API.
#[derive(Debug, Clone)]
pub struct RestCountriesCatalog {
    url: String,
    http: Client,
}

impl RestCountriesCatalog {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl CountryCatalog for RestCountriesCatalog {
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError> {
        tracing::debug!(url = %self.url, "fetching country catalog");

        let res = self.http.get(&self.url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Outcome of resolving one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub matches: Vec<Country>,
    /// Set iff there is exactly one match.
    pub auto_selected: Option<Country>,
}

impl Resolution {
    pub fn from_matches(matches: Vec<Country>) -> Self {
        let auto_selected = match matches.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        Self {
            matches,
            auto_selected,
        }
    }
}

/// Countries whose common name contains `query`, case-insensitively, in
/// catalog order.
pub fn filter_by_name(catalog: &[Country], query: &str) -> Vec<Country> {
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|country| country.name_contains(&needle))
        .cloned()
        .collect()
}

pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Fetches the catalog for every non-blank query and filters it.
#[derive(Debug, Clone)]
pub struct CountryResolver {
    catalog: Arc<dyn CountryCatalog>,
}

impl CountryResolver {
    pub fn new(catalog: Arc<dyn CountryCatalog>) -> Self {
        Self { catalog }
    }

    /// Blank queries resolve to nothing without touching the network.
    /// Fetch failures are logged and treated as "no matches".
    pub async fn resolve(&self, query: &str) -> Resolution {
        if is_blank(query) {
            return Resolution::default();
        }

        match self.catalog.fetch_all().await {
            Ok(countries) => {
                let resolution = Resolution::from_matches(filter_by_name(&countries, query));
                tracing::debug!(
                    query,
                    matches = resolution.matches.len(),
                    "resolved country query"
                );
                resolution
            }
            Err(err) => {
                tracing::warn!(
                    query,
                    status = ?err.http_status(),
                    error = %err,
                    "country catalog fetch failed"
                );
                Resolution::default()
            }
        }
    }
}
