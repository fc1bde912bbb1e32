//! Plain-text rendering of the session view.

use std::fmt::Write;

use countries_core::{Country, MatchView, SelectionView, View, WeatherSummary, WeatherView};

pub const TOO_MANY: &str = "Too many matches, be more specific.";

pub fn render(view: &View<'_>) -> String {
    let mut out = String::new();

    match view.matches {
        MatchView::Idle | MatchView::Single | MatchView::NoMatches => {}
        MatchView::Searching => out.push_str("searching...\n"),
        MatchView::TooMany(_) => {
            out.push_str(TOO_MANY);
            out.push('\n');
        }
        MatchView::Listing(countries) => {
            for country in countries {
                let _ = writeln!(out, "  {} [{}]", country.common_name, country.alpha3_code);
            }
        }
    }

    if let Some(selection) = &view.selection {
        if !out.is_empty() {
            out.push('\n');
        }
        render_selection(&mut out, selection);
    }

    out
}

fn render_selection(out: &mut String, selection: &SelectionView<'_>) {
    let country = selection.country;
    render_country(out, country);

    match selection.weather {
        WeatherView::Enriched(summary) => {
            let capital = country.primary_capital().unwrap_or_default();
            out.push('\n');
            render_weather(out, capital, summary);
        }
        WeatherView::Pending => out.push_str("\nloading weather...\n"),
        WeatherView::Unavailable => {}
    }
}

fn render_country(out: &mut String, country: &Country) {
    let languages = country.language_names().collect::<Vec<_>>().join(", ");

    let _ = writeln!(out, "{}", country.common_name);
    let _ = writeln!(out, "capital {}", country.primary_capital().unwrap_or("N/A"));
    let _ = writeln!(out, "area {}", country.area_km2);
    let _ = writeln!(out, "languages {languages}");
    if !country.flag_image_url.is_empty() {
        let _ = writeln!(out, "flag {}", country.flag_image_url);
    }
}

fn render_weather(out: &mut String, capital: &str, summary: &WeatherSummary) {
    let _ = writeln!(out, "Weather in {capital}");
    let _ = writeln!(out, "Temperature: {}°C", summary.temperature_celsius);
    let _ = writeln!(out, "Wind: {} m/s", summary.wind_speed_ms);
    if summary.has_icon() {
        let _ = writeln!(out, "icon {}", summary.icon_url);
    }
}
