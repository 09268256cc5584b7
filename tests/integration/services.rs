//! Integration tests for the matcher and calendar clients

use serde_json::json;
use sigmapips::models::{ChatTarget, Signal};
use sigmapips::services::{
    CalendarSource, HttpCalendarSource, HttpSubscriberMatcher, SubscriberMatcher,
};
use sigmapips::Error;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn matcher(server: &MockServer) -> HttpSubscriberMatcher {
    HttpSubscriberMatcher::with_client(&format!("{}/", server.uri()), reqwest::Client::new())
}

#[tokio::test]
async fn matcher_posts_signal_and_reads_subscribers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .and(body_partial_json(json!({"symbol": "GBPUSD", "interval": "4h"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matched_subscribers": [{"chat_id": 9, "name": "Zoe"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let signal = Signal {
        symbol: Some("GBPUSD".to_string()),
        interval: Some("4h".into()),
        ..Signal::default()
    };
    let subscribers = assert_ok!(matcher(&server).match_subscribers(&signal).await);
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].chat_id, Some(ChatTarget(9)));
    assert_eq!(subscribers[0].display_name(), "Zoe");
}

#[tokio::test]
async fn matcher_non_success_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = assert_err!(matcher(&server).match_subscribers(&Signal::default()).await);
    assert!(matches!(
        err,
        Error::UpstreamUnavailable { service: "subscriber matcher", .. }
    ));
    assert!(err.to_string().contains("failed to get subscribers"));
}

#[tokio::test]
async fn calendar_returns_events_in_service_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"time": "12:30", "country": "US", "event": "CPI", "impact": 3, "forecast": "3.1%", "previous": "3.2%"},
            {"time": "14:00", "country": "US", "event": "FOMC", "impact": 3}
        ])))
        .mount(&server)
        .await;

    let calendar = HttpCalendarSource::with_client(&server.uri(), reqwest::Client::new());
    let events = assert_ok!(calendar.latest_events().await);
    let names: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
    assert_eq!(names, vec!["CPI", "FOMC"]);
    assert_eq!(events[0].previous.as_deref(), Some("3.2%"));
}

#[tokio::test]
async fn calendar_failures_are_upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let calendar = HttpCalendarSource::with_client(&server.uri(), reqwest::Client::new());
    let err = assert_err!(calendar.latest_events().await);
    assert!(matches!(
        err,
        Error::UpstreamUnavailable { service: "calendar service", .. }
    ));
}

#[tokio::test]
async fn calendar_with_label_impact_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"time": "12:30", "country": "US", "event": "CPI", "impact": 3},
            {"time": "14:00", "country": "US", "event": "FOMC", "impact": "High"}
        ])))
        .mount(&server)
        .await;

    let calendar = HttpCalendarSource::with_client(&server.uri(), reqwest::Client::new());
    let err = assert_err!(calendar.latest_events().await);
    assert!(matches!(
        err,
        Error::UpstreamUnavailable { service: "calendar service", .. }
    ));
}
