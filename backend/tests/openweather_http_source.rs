//! Contract tests for the OpenWeather adapter against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Url;
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use backend::domain::ports::{WeatherSource, WeatherSourceError};
use backend::domain::{RefreshPolicy, WeatherRefreshPorts, WeatherRefreshService};
use backend::outbound::memory::InMemoryWeatherRepository;
use backend::outbound::openweather::{OpenWeatherHttpIdentity, OpenWeatherHttpSource};
use backend::test_support::weather::city;

const API_KEY: &str = "test-key";

fn source_for(server: &MockServer, api_key: Option<&str>) -> OpenWeatherHttpSource {
    let base = Url::parse(&server.uri()).expect("mock server URI parses");
    OpenWeatherHttpSource::new(
        base,
        api_key.map(str::to_owned),
        Duration::from_millis(500),
    )
    .expect("client builds")
}

fn london_body() -> serde_json::Value {
    json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [ { "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" } ],
        "main": { "temp": 284.15, "feels_like": 283.4, "humidity": 81 },
        "name": "London",
        "cod": 200
    })
}

#[tokio::test]
async fn sends_city_and_key_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    let observation = source_for(&server, Some(API_KEY))
        .fetch_current(&city("London"))
        .await
        .expect("provider answers");

    assert_eq!(observation.condition.as_str(), "Rain");
    assert_eq!(observation.temperature, 284.15);
}

#[tokio::test]
async fn omits_appid_when_no_key_is_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "São Paulo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    source_for(&server, None)
        .fetch_current(&city("São Paulo"))
        .await
        .expect("provider answers");

    let requests = server.received_requests().await.expect("recording enabled");
    let request = requests.first().expect("one request");
    assert!(
        request.url.query_pairs().all(|(key, _)| key != "appid"),
        "appid must not be sent: {}",
        request.url
    );
}

#[tokio::test]
async fn sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::header("user-agent", "weather-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source = OpenWeatherHttpSource::with_identity(
        Url::parse(&server.uri()).expect("mock server URI parses"),
        None,
        Duration::from_millis(500),
        OpenWeatherHttpIdentity {
            user_agent: "weather-tests/1.0".to_owned(),
        },
    )
    .expect("client builds");

    source
        .fetch_current(&city("London"))
        .await
        .expect("provider answers");
}

#[rstest]
#[case::rate_limited(429, "rate_limited")]
#[case::unauthorised(401, "rejected")]
#[case::unknown_city(404, "rejected")]
#[case::gateway_timeout(504, "timeout")]
#[case::server_error(500, "transport")]
#[case::unavailable(503, "transport")]
#[tokio::test]
async fn error_statuses_map_to_source_errors(#[case] status: u16, #[case] kind: &str) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({"cod": status, "message": "nope"})),
        )
        .mount(&server)
        .await;

    let error = source_for(&server, Some(API_KEY))
        .fetch_current(&city("London"))
        .await
        .expect_err("status is an error");

    assert_eq!(error.kind(), kind);
    assert!(
        !error.to_string().contains(API_KEY),
        "API key must not leak into errors: {error}"
    );
}

#[tokio::test]
async fn empty_weather_list_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"weather": [], "main": {"temp": 280.0}})),
        )
        .mount(&server)
        .await;

    let error = source_for(&server, None)
        .fetch_current(&city("London"))
        .await
        .expect_err("empty list rejected");
    assert!(matches!(error, WeatherSourceError::Decode { .. }));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(london_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let error = source_for(&server, Some(API_KEY))
        .fetch_current(&city("London"))
        .await
        .expect_err("request exceeds timeout");
    assert_eq!(error.kind(), "timeout");
    assert!(!error.to_string().contains(API_KEY));
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };
    let base = Url::parse(&format!("http://127.0.0.1:{port}")).expect("valid base");

    let source = OpenWeatherHttpSource::new(base, None, Duration::from_millis(500))
        .expect("client builds");
    let error = source
        .fetch_current(&city("London"))
        .await
        .expect_err("nothing is listening");
    assert!(matches!(
        error,
        WeatherSourceError::Transport { .. } | WeatherSourceError::Timeout { .. }
    ));
}

#[tokio::test]
async fn concurrent_lookups_for_one_city_reach_the_provider_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(london_body())
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = Arc::new(WeatherRefreshService::new(
        WeatherRefreshPorts::new(
            Arc::new(InMemoryWeatherRepository::new()),
            Arc::new(source_for(&server, Some(API_KEY))),
        ),
        Arc::new(mockable::DefaultClock),
        RefreshPolicy::default(),
    ));

    let london = city("London");
    let lookups = join_all((0..8).map(|_| {
        let service = service.clone();
        let london = london.clone();
        async move { service.get_or_retrieve(&london).await }
    }))
    .await;

    for lookup in &lookups {
        assert_eq!(lookup.record.condition().as_str(), "Rain");
        assert!(lookup.store_failure.is_none());
    }
}
