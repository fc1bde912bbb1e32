//! Selection state machine.
//!
//! `Session` is a pure reducer: events in, effects out. It never performs I/O;
//! the [`Pipeline`](crate::pipeline::Pipeline) executes the effects and feeds
//! their results back as events.
//!
//! Every async request carries a [`RequestToken`]. A result is applied only
//! while its token is still the latest one issued for that stage, so a slow
//! response for an old query can never overwrite newer state.

use crate::{
    catalog::{Resolution, is_blank},
    model::{Country, WeatherSummary},
};

/// Above this many matches nothing is listed.
pub const MAX_LISTED: usize = 10;

/// Monotonic id of the latest request issued for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    fn advance(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The query text changed (every keystroke).
    QueryChanged(String),

    /// Catalog fetch for the query issued under `token` finished.
    MatchesResolved {
        token: RequestToken,
        resolution: Resolution,
    },

    /// User picked a listed country, by alpha-3 code.
    CountryShown(String),

    /// Weather fetch issued under `token` finished.
    WeatherResolved {
        token: RequestToken,
        summary: Option<WeatherSummary>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ResolveQuery { token: RequestToken, query: String },
    FetchWeather { token: RequestToken, country: Country },
    CancelQuery,
    CancelWeather,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Weather {
    #[default]
    None,
    Pending,
    Ready(WeatherSummary),
    Unavailable,
}

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listing,
    Selected,
    Enriched,
    SelectedNoWeather,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    query: String,
    query_token: RequestToken,
    resolving: bool,
    matches: Vec<Country>,
    selected: Option<Country>,
    weather_token: RequestToken,
    weather: Weather,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[Country] {
        &self.matches
    }

    pub fn selected(&self) -> Option<&Country> {
        self.selected.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherSummary> {
        match &self.weather {
            Weather::Ready(summary) => Some(summary),
            _ => None,
        }
    }

    pub(crate) fn query_token(&self) -> RequestToken {
        self.query_token
    }

    pub(crate) fn weather_token(&self) -> RequestToken {
        self.weather_token
    }

    pub fn is_weather_pending(&self) -> bool {
        self.weather == Weather::Pending
    }

    /// Apply one event and return the side effects it requires.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::QueryChanged(query) => self.on_query(query),
            Event::MatchesResolved { token, resolution } => self.on_matches(token, resolution),
            Event::CountryShown(code) => self.on_show(&code),
            Event::WeatherResolved { token, summary } => self.on_weather(token, summary),
        }
    }

    fn on_query(&mut self, query: String) -> Vec<Effect> {
        if query == self.query {
            return Vec::new();
        }

        let token = self.query_token.advance();
        self.query = query;
        self.matches.clear();

        let mut effects = self.clear_selection();

        if is_blank(&self.query) {
            self.resolving = false;
            effects.push(Effect::CancelQuery);
        } else {
            self.resolving = true;
            effects.push(Effect::ResolveQuery {
                token,
                query: self.query.clone(),
            });
        }
        effects
    }

    fn on_matches(&mut self, token: RequestToken, resolution: Resolution) -> Vec<Effect> {
        if token != self.query_token {
            tracing::debug!(?token, latest = ?self.query_token, "discarding stale matches");
            return Vec::new();
        }

        self.resolving = false;
        self.matches = resolution.matches;

        match resolution.auto_selected {
            Some(country) => self.select(country),
            None => self.clear_selection(),
        }
    }

    fn on_show(&mut self, code: &str) -> Vec<Effect> {
        if self.selected.as_ref().is_some_and(|c| c.alpha3_code == code) {
            return Vec::new();
        }

        match self.matches.iter().find(|c| c.alpha3_code == code) {
            Some(country) => {
                let country = country.clone();
                self.select(country)
            }
            None => {
                tracing::debug!(code, "ignoring show for a country outside the matches");
                Vec::new()
            }
        }
    }

    fn on_weather(&mut self, token: RequestToken, summary: Option<WeatherSummary>) -> Vec<Effect> {
        if token != self.weather_token || self.weather != Weather::Pending {
            tracing::debug!(?token, latest = ?self.weather_token, "discarding stale weather");
            return Vec::new();
        }

        self.weather = summary.map_or(Weather::Unavailable, Weather::Ready);
        Vec::new()
    }

    fn select(&mut self, country: Country) -> Vec<Effect> {
        let token = self.weather_token.advance();

        let effect = if country.primary_capital().is_some() {
            self.weather = Weather::Pending;
            Effect::FetchWeather {
                token,
                country: country.clone(),
            }
        } else {
            self.weather = Weather::Unavailable;
            Effect::CancelWeather
        };

        self.selected = Some(country);
        vec![effect]
    }

    fn clear_selection(&mut self) -> Vec<Effect> {
        if self.selected.is_none() && self.weather == Weather::None {
            return Vec::new();
        }
        self.weather_token.advance();
        self.selected = None;
        self.weather = Weather::None;
        vec![Effect::CancelWeather]
    }

    pub fn phase(&self) -> Phase {
        match (&self.selected, &self.weather) {
            (Some(_), Weather::Ready(_)) => Phase::Enriched,
            (Some(_), Weather::Unavailable) => Phase::SelectedNoWeather,
            (Some(_), _) => Phase::Selected,
            (None, _) if is_blank(&self.query) => Phase::Idle,
            (None, _) => Phase::Listing,
        }
    }

    /// Presentation state derived from the session.
    pub fn view(&self) -> View<'_> {
        let matches = if is_blank(&self.query) {
            MatchView::Idle
        } else if self.resolving {
            MatchView::Searching
        } else {
            match self.matches.len() {
                0 => MatchView::NoMatches,
                1 => MatchView::Single,
                n if n > MAX_LISTED => MatchView::TooMany(n),
                _ => MatchView::Listing(&self.matches),
            }
        };

        let selection = self.selected.as_ref().map(|country| SelectionView {
            country,
            weather: match &self.weather {
                Weather::Ready(summary) => WeatherView::Enriched(summary),
                Weather::Pending => WeatherView::Pending,
                Weather::None | Weather::Unavailable => WeatherView::Unavailable,
            },
        });

        View { matches, selection }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View<'a> {
    pub matches: MatchView<'a>,
    pub selection: Option<SelectionView<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchView<'a> {
    Idle,
    Searching,
    NoMatches,
    /// Exactly one match; it is shown as the selection.
    Single,
    TooMany(usize),
    Listing(&'a [Country]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionView<'a> {
    pub country: &'a Country,
    pub weather: WeatherView<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeatherView<'a> {
    Pending,
    Enriched(&'a WeatherSummary),
    Unavailable,
}
