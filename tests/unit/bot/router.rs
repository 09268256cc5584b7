//! Unit tests for callback token decoding and routing

use crate::common_fakes::{conversation, user, StaticCalendar};
use sigmapips::bot::conversation::INVALID_REQUEST;
use sigmapips::bot::{decode, CallbackRouter, DecodedAction};
use sigmapips::models::PreferenceId;
use sigmapips::store::InMemoryPreferenceStore;
use sigmapips::Error;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

#[test]
fn decodes_every_token_shape() {
    assert_eq!(
        assert_ok!(decode("market_Forex")),
        DecodedAction::Market {
            market: "Forex".to_string()
        }
    );
    assert_eq!(
        assert_ok!(decode("instrument_EURUSD")),
        DecodedAction::Instrument {
            instrument: "EURUSD".to_string()
        }
    );
    assert_eq!(
        assert_ok!(decode("timeframe_1h_EURUSD")),
        DecodedAction::Timeframe {
            timeframe: "1h".to_string(),
            instrument: "EURUSD".to_string()
        }
    );
    assert_eq!(
        assert_ok!(decode("delete_42")),
        DecodedAction::Delete {
            id: PreferenceId::new("42")
        }
    );
    assert_eq!(assert_ok!(decode("back")), DecodedAction::Back);
    assert_eq!(
        assert_ok!(decode("refresh_calendar")),
        DecodedAction::RefreshCalendar
    );
    assert_eq!(
        assert_ok!(decode("view_prefs")),
        DecodedAction::ViewPreferences
    );
}

#[test]
fn delete_accepts_uuid_style_ids() {
    let action = assert_ok!(decode("delete_5f0c2a1e-8b7d-4c11-9e2f-0a1b2c3d4e5f"));
    assert_eq!(
        action,
        DecodedAction::Delete {
            id: PreferenceId::new("5f0c2a1e-8b7d-4c11-9e2f-0a1b2c3d4e5f")
        }
    );
}

#[test]
fn encoded_actions_decode_to_themselves() {
    let actions = [
        DecodedAction::Timeframe {
            timeframe: "15m".to_string(),
            instrument: "XAUUSD".to_string(),
        },
        DecodedAction::Delete {
            id: PreferenceId::new("7"),
        },
        DecodedAction::RefreshCalendar,
    ];
    for action in actions {
        assert_eq!(assert_ok!(decode(&action.encode())), action);
    }
}

#[test]
fn timeframe_token_puts_timeframe_first() {
    let token = DecodedAction::Timeframe {
        timeframe: "4h".to_string(),
        instrument: "GER40".to_string(),
    }
    .encode();
    assert_eq!(token, "timeframe_4h_GER40");
}

#[test]
fn rejects_malformed_tokens() {
    let malformed = [
        "",
        "market",
        "market_",
        "market_Forex_extra",
        "instrument_EUR/USD",
        "timeframe_1h",
        "timeframe__EURUSD",
        "timeframe_1h_EUR_USD",
        "delete_",
        "delete_1;drop",
        "back_now",
        "refresh",
        "refresh_news",
        "view",
        "subscribe_EURUSD",
        "MARKET_Forex",
    ];
    for token in malformed {
        let err = assert_err!(decode(token), "token {:?} should be rejected", token);
        assert!(matches!(err, Error::Malformed(ref t) if t == token));
    }
}

#[tokio::test]
async fn malformed_token_routes_to_invalid_request_notice() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let router = CallbackRouter::new(conversation(store.clone(), StaticCalendar::Events(vec![])));

    let reply = router.route("timeframe_1h", &user(7)).await;
    assert!(reply.view.is_none());
    assert_eq!(reply.notice.as_deref(), Some(INVALID_REQUEST));
    assert!(store.all().await.is_empty());
}

#[tokio::test]
async fn valid_token_routes_to_conversation() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let router = CallbackRouter::new(conversation(store, StaticCalendar::Events(vec![])));

    let reply = router.route("market_Indices", &user(7)).await;
    let view = reply.view.expect("instrument menu");
    assert!(view.keyboard.tokens().contains(&"instrument_US500"));
}
