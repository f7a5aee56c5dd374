//! Integration tests for GoogleGeocoder using wiremock.

use liveweather_core::{Coordinates, Geocoder, GoogleGeocoder, WeatherError, geocode::place_name_at};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn geocoder(server: &MockServer) -> GoogleGeocoder {
    GoogleGeocoder::with_base_url("gkey".into(), server.uri()).unwrap()
}

#[tokio::test]
async fn test_returns_components_of_first_result() {
    let server = MockServer::start().await;
    mount(
        &server,
        serde_json::json!({
            "status": "OK",
            "results": [
                { "address_components": [
                    { "long_name": "Chennai", "short_name": "Chennai", "types": ["locality", "political"] }
                ]},
                { "address_components": [
                    { "long_name": "Tamil Nadu", "short_name": "TN", "types": ["administrative_area_level_1"] }
                ]}
            ]
        }),
    )
    .await;

    let components = geocoder(&server).reverse_geocode(Coordinates::new(13.08, 80.27)).await.unwrap();

    assert_eq!(components.len(), 1);
    assert_eq!(components[0].long_name, "Chennai");
    assert!(components[0].has_type("locality"));
}

#[tokio::test]
async fn test_place_name_prefers_district_over_state() {
    let server = MockServer::start().await;
    mount(
        &server,
        serde_json::json!({
            "status": "OK",
            "results": [{ "address_components": [
                { "long_name": "Karnataka", "types": ["administrative_area_level_1"] },
                { "long_name": "Kodagu", "types": ["administrative_area_level_2"] }
            ]}]
        }),
    )
    .await;

    let name = place_name_at(&geocoder(&server), Coordinates::new(12.4, 75.7)).await.unwrap();
    assert_eq!(name, "Kodagu");
}

#[tokio::test]
async fn test_zero_results_is_place_unresolved() {
    let server = MockServer::start().await;
    mount(&server, serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })).await;

    let err = place_name_at(&geocoder(&server), Coordinates::new(0.0, -30.0)).await.unwrap_err();
    assert_eq!(err, WeatherError::PlaceUnresolved);
}

#[tokio::test]
async fn test_denied_request_is_network_failure() {
    let server = MockServer::start().await;
    mount(
        &server,
        serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        }),
    )
    .await;

    let err = geocoder(&server).reverse_geocode(Coordinates::new(1.0, 1.0)).await.unwrap_err();
    match err {
        WeatherError::NetworkFailure(msg) => {
            assert!(msg.contains("REQUEST_DENIED"));
            assert!(msg.contains("invalid"));
        }
        other => panic!("expected NetworkFailure, got {other:?}"),
    }
}
