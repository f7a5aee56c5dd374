//! End-to-end dashboard flows against mocked weather and geocoding APIs.

use std::sync::Arc;
use std::time::Duration;

use liveweather_core::{
    Coordinates, Dashboard, FetchOutcome, FetchPipeline, Geocoder, GoogleGeocoder,
    OpenWeatherProvider, RecentCities, Request, WeatherError, WeatherProvider,
    location::FixedGeolocator,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_json(name: &str, lat: f64, lon: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": lon, "lat": lat },
        "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": { "temp": 18.2, "feels_like": 17.5, "pressure": 1015, "humidity": 55 },
        "visibility": 10000,
        "wind": { "speed": 2.5 },
        "sys": { "sunrise": 1_717_200_000, "sunset": 1_717_250_000 },
        "name": name
    })
}

fn forecast_json(count: i64) -> serde_json::Value {
    let list: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "dt": 1_717_200_000 + i * 3 * 3600,
                "main": { "temp": 10.0 + i as f64 },
                "weather": [{ "main": "Clouds", "description": "few clouds", "icon": "02d" }],
                "pop": 0.25
            })
        })
        .collect();
    serde_json::json!({ "list": list, "city": { "name": "X", "country": "Y", "timezone": 0 } })
}

async fn mount_current(server: &MockServer, city: &str, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json(city, lat, lon)))
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(forecast_json(40))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn weather_provider(server: &MockServer) -> Arc<dyn WeatherProvider> {
    Arc::new(OpenWeatherProvider::with_base_url("key".into(), server.uri()).unwrap())
}

fn geocoder(server: &MockServer) -> Arc<dyn Geocoder> {
    Arc::new(GoogleGeocoder::with_base_url("gkey".into(), server.uri()).unwrap())
}

fn dashboard(server: &MockServer, dir: &TempDir) -> Dashboard {
    let pipeline = FetchPipeline::new(weather_provider(server))
        .with_geocoder(geocoder(server))
        .with_geolocator(Arc::new(FixedGeolocator(Coordinates::new(48.85, 2.35))));
    Dashboard::new(pipeline, RecentCities::load_from(dir.path().join("recent.json")))
}

#[tokio::test]
async fn test_search_loads_current_and_forecast() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_current(&server, "Paris", 48.85, 2.35).await;
    mount_forecast(&server, 200).await;

    let mut dash = dashboard(&server, &dir);
    let outcome = dash.search("Paris").await.unwrap();

    assert_eq!(outcome, FetchOutcome::Completed);
    let state = dash.state();
    assert_eq!(state.current.as_ref().unwrap().name, "Paris");
    assert_eq!(state.forecast.hourly.len(), 8);
    assert!(!state.forecast.daily.is_empty());
    assert!(state.forecast.daily.len() <= 7);
    assert!(state.notice.is_none());
    assert!(!state.loading);
    assert_eq!(state.recent.list(), ["Paris"]);

    // Recent cities are persisted on every successful fetch.
    let reloaded = RecentCities::load_from(dir.path().join("recent.json"));
    assert_eq!(reloaded.list(), ["Paris"]);
}

#[tokio::test]
async fn test_forecast_failure_keeps_current_and_stays_silent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_current(&server, "Paris", 48.85, 2.35).await;
    mount_forecast(&server, 500).await;

    let mut dash = dashboard(&server, &dir);
    let outcome = dash.search("Paris").await.unwrap();

    assert_eq!(outcome, FetchOutcome::Completed);
    assert!(dash.state().current.is_some());
    assert!(dash.state().forecast.is_empty());
    assert!(dash.state().notice.is_none());
}

#[tokio::test]
async fn test_not_found_retains_previous_weather() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_current(&server, "Paris", 48.85, 2.35).await;
    mount_forecast(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut dash = dashboard(&server, &dir);
    dash.search("Paris").await.unwrap();
    let err = dash.search("Atlantis").await.unwrap_err();

    assert!(matches!(err, WeatherError::NotFound(_)));
    let state = dash.state();
    assert_eq!(state.current.as_ref().unwrap().name, "Paris");
    assert_eq!(state.notice.as_deref(), Some("City not found!"));
    assert_eq!(state.recent.list(), ["Paris"]);
}

#[tokio::test]
async fn test_map_click_resolves_locality_then_fetches_by_coordinates() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_forecast(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("latlng", "43.3,5.4"))
        .and(query_param("key", "gkey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{
                "address_components": [
                    { "long_name": "State", "short_name": "ST", "types": ["administrative_area_level_1", "political"] },
                    { "long_name": "City", "short_name": "City", "types": ["locality", "political"] }
                ]
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "43.3"))
        .and(query_param("lon", "5.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Marseille", 43.3, 5.4)))
        .mount(&server)
        .await;

    let mut dash = dashboard(&server, &dir);
    dash.map_click(Coordinates::new(43.3, 5.4)).await.unwrap();

    let state = dash.state();
    assert_eq!(state.picked_place.as_deref(), Some("City"));
    assert_eq!(state.current.as_ref().unwrap().name, "Marseille");
}

#[tokio::test]
async fn test_map_click_without_place_does_not_fetch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Sea", 0.0, 0.0)))
        .expect(0)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server, &dir);
    let err = dash.map_click(Coordinates::new(0.0, -30.0)).await.unwrap_err();

    assert_eq!(err, WeatherError::PlaceUnresolved);
    assert!(dash.state().current.is_none());
    assert!(dash.state().notice.as_deref().unwrap().contains("city or town"));
}

#[tokio::test]
async fn test_map_click_without_geocoder_is_map_unavailable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let pipeline = FetchPipeline::new(weather_provider(&server));
    let mut dash = Dashboard::new(pipeline, RecentCities::load_from(dir.path().join("r.json")));

    let err = dash.map_click(Coordinates::new(1.0, 1.0)).await.unwrap_err();
    assert_eq!(err, WeatherError::MapUnavailable);
    assert!(dash.state().notice.is_some());
}

#[tokio::test]
async fn test_my_location_uses_geolocator() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_forecast(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lon", "2.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Paris", 48.85, 2.35)))
        .mount(&server)
        .await;

    let mut dash = dashboard(&server, &dir);
    dash.use_my_location().await.unwrap();

    assert_eq!(dash.state().current.as_ref().unwrap().name, "Paris");
}

#[tokio::test]
async fn test_my_location_denied_by_default() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let pipeline = FetchPipeline::new(weather_provider(&server));
    let mut dash = Dashboard::new(pipeline, RecentCities::load_from(dir.path().join("r.json")));

    let err = dash.use_my_location().await.unwrap_err();
    assert_eq!(err, WeatherError::GeolocationDenied);
}

#[tokio::test]
async fn test_newer_search_supersedes_slow_one() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_forecast(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Slowtown"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_json("Slowtown", 1.0, 1.0))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    mount_current(&server, "Fastville", 2.0, 2.0).await;

    let mut dash = dashboard(&server, &dir);
    let slow = dash.dispatch(Request::Search(liveweather_core::Locator::City("Slowtown".into())));
    let fast = dash.search("Fastville").await.unwrap();

    assert_eq!(fast, FetchOutcome::Completed);
    assert_eq!(slow.await.unwrap().unwrap(), FetchOutcome::Superseded);

    dash.sync();
    assert_eq!(dash.state().current.as_ref().unwrap().name, "Fastville");
    assert_eq!(dash.state().recent.list(), ["Fastville"]);
}

#[tokio::test]
async fn test_recent_cities_dedupe_across_searches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_forecast(&server, 200).await;
    for city in ["Rome", "Oslo", "Lima", "Kyiv", "Baku", "Riga"] {
        mount_current(&server, city, 0.0, 0.0).await;
    }

    let mut dash = dashboard(&server, &dir);
    for city in ["Rome", "Oslo", "Lima", "Kyiv", "Baku", "Riga"] {
        dash.search(city).await.unwrap();
    }
    assert_eq!(dash.state().recent.list(), ["Riga", "Baku", "Kyiv", "Lima", "Oslo"]);

    dash.search("Oslo").await.unwrap();
    assert_eq!(dash.state().recent.list(), ["Oslo", "Riga", "Baku", "Kyiv", "Lima"]);
}
