//! Tests du puits d'analytique HTTP

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use muzserver::analytics::{AnalyticsSink, HttpSink};

#[tokio::test]
async fn test_http_sink_posts_event_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events"))
        .and(body_partial_json(serde_json::json!({
            "query": "shape of you",
            "event": "metadata_requested",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink = HttpSink::new(format!("{}/events", server.uri()));
    sink.record("shape of you", "metadata_requested");

    // L'envoi est détaché : on laisse la tâche aboutir
    tokio::time::sleep(Duration::from_millis(300)).await;
    server.verify().await;
}

#[tokio::test]
async fn test_http_sink_swallows_delivery_failure() {
    // Collecteur injoignable : record ne panique pas et ne bloque pas
    let sink = HttpSink::new("http://127.0.0.1:1/events".to_string());
    sink.record("any", "stream_requested");
    tokio::time::sleep(Duration::from_millis(100)).await;
}
