//! End-to-end pipeline tests against mocked catalog and weather endpoints.

use std::time::Duration;

use countries_core::{Config, Event, MatchView, Phase, Pipeline, Reading, WeatherView};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const CATALOG_PATH: &str = "/api/all";
const WEATHER_PATH: &str = "/data/2.5/weather";

fn record(name: &str, code: &str, capital: Option<&str>) -> serde_json::Value {
    let mut value = serde_json::json!({
        "name": { "common": name },
        "cca3": code,
        "area": 1000.0,
        "languages": { "eng": "English" },
        "flags": { "png": format!("https://flagcdn.com/w320/{code}.png") }
    });
    if let Some(capital) = capital {
        value["capital"] = serde_json::json!([capital]);
    }
    value
}

fn catalog() -> serde_json::Value {
    serde_json::json!([
        record("Finland", "FIN", Some("Helsinki")),
        record("Sweden", "SWE", Some("Stockholm")),
        record("Switzerland", "CHE", Some("Bern")),
        record("Antarctica", "ATA", None),
        record("Iceland", "ISL", Some("Reykjavik")),
        record("Poland", "POL", Some("Warsaw")),
        record("Thailand", "THA", Some("Bangkok")),
        record("Netherlands", "NLD", Some("Amsterdam")),
        record("New Zealand", "NZL", Some("Wellington")),
        record("Greenland", "GRL", Some("Nuuk")),
        record("Ireland", "IRL", Some("Dublin")),
        record("Åland Islands", "ALA", Some("Mariehamn")),
        record("Falkland Islands", "FLK", Some("Stanley")),
        record("Cook Islands", "COK", Some("Avarua")),
    ])
}

fn weather_body() -> serde_json::Value {
    serde_json::json!({
        "main": { "temp": 20.5 },
        "wind": { "speed": 3.1 },
        "weather": [{ "icon": "01d" }]
    })
}

fn config(server: &MockServer) -> Config {
    Config {
        weather_api_key: Some("TEST_KEY".into()),
        catalog_url: format!("{}{CATALOG_PATH}", server.uri()),
        weather_url: format!("{}{WEATHER_PATH}", server.uri()),
        request_timeout_secs: Some(5),
        ..Config::default()
    }
}

async fn mount_catalog(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_match_is_selected_and_enriched() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Helsinki"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("fin").await;

    let names: Vec<_> = session.matches().iter().map(|c| &c.common_name).collect();
    assert_eq!(names, vec!["Finland"]);
    assert_eq!(session.selected().map(|c| c.alpha3_code.as_str()), Some("FIN"));
    assert_eq!(session.phase(), Phase::Enriched);

    let summary = session.weather().expect("weather summary");
    assert_eq!(summary.temperature_celsius, Reading::Value(20.5));
    assert_eq!(summary.wind_speed_ms, Reading::Value(3.1));
    assert_eq!(summary.icon_url, "https://openweathermap.org/img/wn/01d@2x.png");
}

#[tokio::test]
async fn too_many_matches_skip_selection_and_weather() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("LAND").await;

    assert_eq!(session.view().matches, MatchView::TooMany(12));
    assert!(session.selected().is_none());
    assert_eq!(session.phase(), Phase::Listing);
}

#[tokio::test]
async fn weather_not_found_keeps_country_details() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("finl").await;

    assert!(session.weather().is_none());
    assert_eq!(session.phase(), Phase::SelectedNoWeather);

    let selection = session.view().selection.expect("country details");
    assert_eq!(selection.country.common_name, "Finland");
    assert_eq!(selection.weather, WeatherView::Unavailable);
}

#[tokio::test]
async fn country_without_capital_makes_no_weather_request() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("antarc").await;

    assert_eq!(
        session.selected().map(|c| c.common_name.as_str()),
        Some("Antarctica")
    );
    assert_eq!(session.phase(), Phase::SelectedNoWeather);
}

#[tokio::test]
async fn blank_query_makes_no_request() {
    let server = MockServer::start().await;
    mount_catalog(&server, 0).await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("   ").await;

    assert!(session.matches().is_empty());
    assert_eq!(session.phase(), Phase::Idle);
    assert!(!pipeline.is_busy());
}

#[tokio::test]
async fn catalog_failure_shows_no_matches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("fin").await;

    assert_eq!(session.view().matches, MatchView::NoMatches);
    assert!(session.selected().is_none());
}

#[tokio::test]
async fn malformed_catalog_shows_no_matches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();
    let session = pipeline.search("fin").await;

    assert_eq!(session.view().matches, MatchView::NoMatches);
}

#[tokio::test]
async fn explicit_show_fetches_weather_for_listed_country() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Bern"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();

    let session = pipeline.search("sw").await;
    assert_eq!(session.phase(), Phase::Listing);
    assert!(matches!(session.view().matches, MatchView::Listing(list) if list.len() == 2));

    let session = pipeline.show("CHE").await;
    assert_eq!(session.phase(), Phase::Enriched);
    assert_eq!(
        session.selected().map(|c| c.common_name.as_str()),
        Some("Switzerland")
    );
}

#[tokio::test]
async fn superseded_query_never_overwrites_newer_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(catalog())
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::from_config(&config(&server)).unwrap();

    pipeline.dispatch(Event::QueryChanged("sw".into()));
    pipeline.dispatch(Event::QueryChanged("fin".into()));
    pipeline.settle().await;

    let session = pipeline.session();
    assert_eq!(session.query(), "fin");
    assert_eq!(session.matches().len(), 1);
    assert_eq!(session.selected().map(|c| c.alpha3_code.as_str()), Some("FIN"));
}

#[tokio::test]
async fn debounce_collapses_rapid_keystrokes() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.debounce_ms = 50;
    let mut pipeline = Pipeline::from_config(&cfg).unwrap();

    for query in ["f", "fi", "fin"] {
        pipeline.dispatch(Event::QueryChanged(query.into()));
    }
    pipeline.settle().await;

    assert_eq!(pipeline.session().phase(), Phase::Enriched);
}
