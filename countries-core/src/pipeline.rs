//! Drives a [`Session`] by running its effects as background tasks.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{
    catalog::{CountryResolver, Resolution, RestCountriesCatalog},
    config::Config,
    enricher::WeatherEnricher,
    provider::OpenWeatherProvider,
    session::{Effect, Event, Session},
    tasks::{Completion, Finished, TaskKey, TaskManager},
};

const CATALOG: TaskKey = TaskKey::new("catalog");
const WEATHER: TaskKey = TaskKey::new("weather");

#[derive(Debug)]
pub struct Pipeline {
    session: Session,
    resolver: CountryResolver,
    enricher: WeatherEnricher,
    debounce: Option<Duration>,
    tasks: TaskManager<Event>,
    results: mpsc::UnboundedReceiver<Finished<Event>>,
}

impl Pipeline {
    pub fn new(
        resolver: CountryResolver,
        enricher: WeatherEnricher,
        debounce: Option<Duration>,
    ) -> Self {
        let (tx, results) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            resolver,
            enricher,
            debounce,
            tasks: TaskManager::new(tx),
            results,
        }
    }

    /// Wire the REST Countries catalog and OpenWeather from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = config.http_client()?;

        let catalog = RestCountriesCatalog::new(&config.catalog_url, http.clone());
        let provider = OpenWeatherProvider::new(config.api_key(), &config.weather_url, http);

        Ok(Self::new(
            CountryResolver::new(Arc::new(catalog)),
            WeatherEnricher::new(Arc::new(provider), &config.icon_base_url),
            config.debounce(),
        ))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether a fetch is still in flight.
    pub fn is_busy(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Apply an event and start whatever fetches it calls for.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: Event) {
        let effects = self.session.update(event);
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::ResolveQuery { token, query } => {
                let resolver = self.resolver.clone();
                let fetch = async move {
                    let resolution = resolver.resolve(&query).await;
                    Event::MatchesResolved { token, resolution }
                };
                match self.debounce {
                    Some(delay) => self.tasks.debounce(CATALOG, delay, fetch),
                    None => self.tasks.spawn(CATALOG, fetch),
                };
            }
            Effect::FetchWeather { token, country } => {
                let enricher = self.enricher.clone();
                self.tasks.spawn(WEATHER, async move {
                    let summary = enricher.enrich(Some(&country)).await;
                    Event::WeatherResolved { token, summary }
                });
            }
            Effect::CancelQuery => self.tasks.cancel(CATALOG),
            Effect::CancelWeather => self.tasks.cancel(WEATHER),
        }
    }

    /// Wait for one fetch to finish and apply its result.
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn next_event(&mut self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        let Some(report) = self.results.recv().await else {
            return false;
        };

        match self.tasks.finish(report) {
            Completion::Done(event) => self.dispatch(event),
            Completion::Panicked(key) => self.dispatch(self.fallback(key)),
            Completion::Stale => {}
        }
        true
    }

    /// Empty result for the current request of a task that died.
    fn fallback(&self, key: TaskKey) -> Event {
        if key == CATALOG {
            Event::MatchesResolved {
                token: self.session.query_token(),
                resolution: Resolution::default(),
            }
        } else {
            Event::WeatherResolved {
                token: self.session.weather_token(),
                summary: None,
            }
        }
    }

    /// Apply results until no fetch is in flight.
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    /// Shortcut for a query change followed by [`settle`](Self::settle).
    pub async fn search(&mut self, query: impl Into<String>) -> &Session {
        self.dispatch(Event::QueryChanged(query.into()));
        self.settle().await;
        &self.session
    }

    /// Explicit "show" on a listed country, then wait for its weather.
    pub async fn show(&mut self, alpha3_code: impl Into<String>) -> &Session {
        self.dispatch(Event::CountryShown(alpha3_code.into()));
        self.settle().await;
        &self.session
    }
}
