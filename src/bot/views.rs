//! Message text and inline keyboard builders for each conversation view

use super::router::DecodedAction;
use crate::catalog::MarketCatalog;
use crate::models::{CalendarEvent, Preference};
use crate::transport::{html_escape, Button, Keyboard};

/// How many calendar events one view shows.
pub const CALENDAR_EVENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub text: String,
    pub keyboard: Keyboard,
}

fn btn(label: &str, action: DecodedAction) -> Button {
    Button::new(label, action.encode())
}

fn back_row() -> Vec<Button> {
    vec![btn("◀️ Back", DecodedAction::Back)]
}

/// Market picker. `heading` differs between /start, back and an emptied list.
pub fn root_menu(catalog: &MarketCatalog, heading: &str) -> View {
    let mut rows: Vec<Vec<Button>> = catalog
        .list_markets()
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|market| {
                    btn(
                        market,
                        DecodedAction::Market {
                            market: market.to_string(),
                        },
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![btn("📋 My Preferences", DecodedAction::ViewPreferences)]);

    View {
        text: heading.to_string(),
        keyboard: Keyboard::new(rows),
    }
}

pub fn instrument_menu(market: &str, instruments: &[String]) -> View {
    let mut rows: Vec<Vec<Button>> = instruments
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|instrument| {
                    btn(
                        instrument,
                        DecodedAction::Instrument {
                            instrument: instrument.clone(),
                        },
                    )
                })
                .collect()
        })
        .collect();
    rows.push(back_row());

    View {
        text: format!("📊 Select {} instrument:", html_escape(market)),
        keyboard: Keyboard::new(rows),
    }
}

pub fn timeframe_menu(instrument: &str, timeframes: &[String]) -> View {
    let row = timeframes
        .iter()
        .map(|timeframe| {
            btn(
                timeframe,
                DecodedAction::Timeframe {
                    timeframe: timeframe.clone(),
                    instrument: instrument.to_string(),
                },
            )
        })
        .collect();

    View {
        text: format!("⏱ Select timeframe for {}:", html_escape(instrument)),
        keyboard: Keyboard::new(vec![row, back_row()]),
    }
}

/// The user's subscriptions, one delete button each, plus "Add More".
pub fn preference_list(heading: &str, preferences: &[Preference]) -> View {
    let mut text = format!("{}📋 Your current preferences:\n\n", heading);
    let mut rows = Vec::with_capacity(preferences.len() + 1);

    for pref in preferences {
        let instrument = html_escape(&pref.instrument);
        let timeframe = html_escape(&pref.timeframe);
        text.push_str(&format!("• {} - {}\n", instrument, timeframe));
        rows.push(vec![btn(
            &format!("🗑 Delete {} {}", instrument, timeframe),
            DecodedAction::Delete {
                id: pref.id.clone(),
            },
        )]);
    }
    rows.push(vec![btn("➕ Add More", DecodedAction::Back)]);

    View {
        text,
        keyboard: Keyboard::new(rows),
    }
}

/// Heading shown above the list right after a save.
pub fn saved_heading(instrument: &str, timeframe: &str) -> String {
    format!(
        "✅ Preference saved!\n\nInstrument: {}\nTimeframe: {}\n\n",
        html_escape(instrument),
        html_escape(timeframe)
    )
}

pub fn calendar(events: &[CalendarEvent]) -> View {
    let mut text = String::from("📅 Economic Calendar Updates\n\n");
    for event in events.iter().take(CALENDAR_EVENT_LIMIT) {
        text.push_str(&format!(
            "🕒 {}\n🏢 {}\n📊 {}\nImpact: {}\nForecast: {}\nPrevious: {}\n\n",
            html_escape(&event.time),
            html_escape(&event.country),
            html_escape(&event.event),
            "🔴".repeat(usize::from(event.impact)),
            html_escape(event.forecast.as_deref().unwrap_or("N/A")),
            html_escape(event.previous.as_deref().unwrap_or("N/A")),
        ));
    }

    View {
        text,
        keyboard: Keyboard::new(vec![vec![btn("🔄 Refresh", DecodedAction::RefreshCalendar)]]),
    }
}
