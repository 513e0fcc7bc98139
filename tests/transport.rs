use iot_dashboard::ServiceClient;
use iot_dashboard::errors::ClientError;
use iot_dashboard::models::{RunState, Service, ServiceStatus};
use iot_dashboard::transport::RealClient;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, timeout: Duration) -> RealClient {
    RealClient::new(&server.uri(), &server.uri(), &server.uri(), timeout).unwrap()
}

#[tokio::test]
async fn test_status_json_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/simulator/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "RUNNING",
            "deviceCount": 25,
            "rate": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let body = client.get_status(Service::Simulator).await.unwrap();
    let status = ServiceStatus::from_json(&body).unwrap();

    assert_eq!(status.state, RunState::Running);
    assert_eq!(status.device_count, Some(25));
    assert_eq!(status.rate, Some(10));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/controller/start"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let body = client.start_stop(Service::Controller, RunState::Running).await.unwrap();
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_stop_uses_stop_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analytics/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "STOPPED"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let body = client.start_stop(Service::Analytics, RunState::Stopped).await.unwrap();
    assert_eq!(body["state"], "STOPPED");
}

#[tokio::test]
async fn test_config_is_sent_as_json_body() {
    let server = MockServer::start().await;
    let payload = json!({"method": "Flowable", "batchSize": 500});
    Mock::given(method("POST"))
        .and(path("/api/analytics/config"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let echoed = client.set_config(Service::Analytics, &payload).await.unwrap();
    assert_eq!(echoed, payload);
}

#[tokio::test]
async fn test_server_error_is_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.get_status(Service::Analytics).await.unwrap_err();

    assert_eq!(err.kind(), "bad-status");
    match err {
        ClientError::BadStatus { status, body, url } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
            assert!(url.ends_with("/api/analytics/status"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/controller/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"state": "RUNNING"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(200));
    let err = client.get_status(Service::Controller).await.unwrap_err();
    assert_eq!(err.kind(), "timeout");
}

#[tokio::test]
async fn test_closed_port_is_connection_refused() {
    let client = RealClient::new(
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
        Duration::from_secs(2),
    )
    .unwrap();

    let err = client.get_status(Service::Simulator).await.unwrap_err();
    assert_eq!(err.kind(), "connection-refused");
    assert_eq!(err.url(), "http://127.0.0.1:1/api/simulator/status");
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/simulator/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.get_status(Service::Simulator).await.unwrap_err();
    assert_eq!(err.kind(), "malformed-body");
}
