//! Notification text for a trading signal

use crate::models::{Signal, SignalValue};
use crate::transport::html_escape;

const UNKNOWN: &str = "Unknown";

fn field(value: Option<&SignalValue>) -> String {
    value
        .map(|v| html_escape(&v.to_string()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Same text for every recipient of one signal.
pub fn format_signal(signal: &Signal) -> String {
    format!(
        "🔔 <b>New Trading Signal</b>\n\
         Symbol: {}\n\
         Action: {}\n\
         Entry: {}\n\
         SL: {}\n\
         TP: {}\n\
         Timeframe: {}\n\n\
         Analysis: {}",
        signal
            .symbol
            .as_deref()
            .map(html_escape)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        signal
            .action
            .as_deref()
            .map(html_escape)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        field(signal.price.as_ref()),
        field(signal.stop_loss.as_ref()),
        field(signal.take_profit.as_ref()),
        field(signal.interval.as_ref()),
        signal
            .ai_analysis
            .as_deref()
            .map(html_escape)
            .unwrap_or_else(|| "No analysis available".to_string()),
    )
}
