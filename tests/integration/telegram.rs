//! Integration tests for the teloxide transport against a fake Bot API server

use serde_json::{json, Value};
use sigmapips::models::ChatTarget;
use sigmapips::transport::telegram::request_timeout;
use sigmapips::transport::{ChatTransport, TelegramTransport, UpdateKind};
use sigmapips::Error;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:test-token";
const NOT_MODIFIED: &str = "Bad Request: message is not modified: specified new message content and reply markup are exactly the same as a current content and reply markup of the message";

/// Bot API method names are case-insensitive; teloxide sends them capitalized.
fn api_method(name: &str) -> wiremock::matchers::PathRegexMatcher {
    path_regex(format!("(?i)^/bot{}/{}$", TOKEN, name))
}

fn transport(server: &MockServer, poll_timeout_secs: u32) -> TelegramTransport {
    assert_ok!(TelegramTransport::with_api_url(
        TOKEN,
        &server.uri(),
        poll_timeout_secs
    ))
}

fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": result}))
}

fn api_error(description: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "ok": false,
        "error_code": 400,
        "description": description
    }))
}

fn trader() -> Value {
    json!({"id": 555, "is_bot": false, "first_name": "Trader"})
}

fn chat_message(message_id: i64, text: &str) -> Value {
    json!({
        "message_id": message_id,
        "date": 1714554000,
        "chat": {"id": 555, "type": "private", "first_name": "Trader"},
        "from": trader(),
        "text": text
    })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.body_json::<Value>().unwrap_or(Value::Null))
        .collect()
}

#[tokio::test]
async fn updates_are_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("getUpdates"))
        .respond_with(ok(json!([
            {"update_id": 10, "message": chat_message(1, "/start@SigmaPipsBot")},
            {"update_id": 11, "callback_query": {
                "id": "cb-1",
                "from": trader(),
                "chat_instance": "ci-1",
                "message": chat_message(200, "Welcome"),
                "data": "market_Forex"
            }},
            {"update_id": 12, "callback_query": {
                "id": "cb-2",
                "from": trader(),
                "chat_instance": "ci-2",
                "inline_message_id": "inline-1",
                "data": "market_Forex"
            }},
            {"update_id": 13, "message": chat_message(2, "hello")}
        ])))
        .mount(&server)
        .await;

    let updates = assert_ok!(transport(&server, 1).fetch_updates(0, 1).await);
    let ids: Vec<i64> = updates.iter().map(|u| u.update_id).collect();
    assert_eq!(ids, vec![10, 11, 12, 13]);

    assert_eq!(
        updates[0].kind,
        UpdateKind::Command {
            chat: ChatTarget(555),
            command: "start".to_string()
        }
    );
    assert_eq!(
        updates[1].kind,
        UpdateKind::Callback {
            id: "cb-1".to_string(),
            chat: ChatTarget(555),
            message_id: 200,
            data: "market_Forex".to_string()
        }
    );
    assert_eq!(updates[2].kind, UpdateKind::Ignored);
    assert_eq!(updates[3].kind, UpdateKind::Ignored);
}

#[tokio::test]
async fn first_poll_sends_no_offset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("getUpdates"))
        .respond_with(ok(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let telegram = transport(&server, 1);
    assert!(assert_ok!(telegram.fetch_updates(0, 1).await).is_empty());
    assert_ok!(telegram.fetch_updates(11, 1).await);

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].get("offset").is_none());
    assert_eq!(bodies[0]["timeout"], 1);
    assert_eq!(bodies[1]["offset"], 11);
}

#[tokio::test]
async fn offset_beyond_api_range_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("getUpdates"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let offset = i64::from(i32::MAX) + 1;
    let err = assert_err!(transport(&server, 1).fetch_updates(offset, 1).await);
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("out of range"));
}

#[tokio::test]
async fn poll_answered_after_the_poll_window_still_arrives() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("getUpdates"))
        .respond_with(ok(json!([])).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    assert_ok!(transport(&server, 1).fetch_updates(0, 1).await);
}

#[test]
fn request_timeout_outlasts_the_long_poll() {
    assert!(request_timeout(60) > Duration::from_secs(60));
    assert!(request_timeout(0) > Duration::ZERO);
}

#[test]
fn invalid_api_url_is_a_transport_error() {
    let err = TelegramTransport::with_api_url(TOKEN, "not a url", 60)
        .err()
        .expect("url rejected");
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn unchanged_edit_counts_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("editMessageText"))
        .respond_with(api_error(NOT_MODIFIED))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(
        transport(&server, 1)
            .edit_message(ChatTarget(555), 200, "📅 Calendar", None)
            .await
    );
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["parse_mode"], "HTML");
    assert_eq!(bodies[0]["message_id"], 200);
}

#[tokio::test]
async fn other_edit_failures_are_transport_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("editMessageText"))
        .respond_with(api_error("Bad Request: message to edit not found"))
        .mount(&server)
        .await;

    let err = assert_err!(
        transport(&server, 1)
            .edit_message(ChatTarget(555), 200, "📅 Calendar", None)
            .await
    );
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("editMessageText"));
}

#[tokio::test]
async fn identify_reads_bot_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(api_method("getMe"))
        .respond_with(ok(json!({
            "id": 777,
            "is_bot": true,
            "first_name": "SigmaPips",
            "username": "SigmaPipsBot",
            "can_join_groups": false,
            "can_read_all_group_messages": false,
            "supports_inline_queries": false
        })))
        .mount(&server)
        .await;

    let name = assert_ok!(transport(&server, 1).identify().await);
    assert_eq!(name, "SigmaPipsBot");
}
