//! Clients for the external HTTP services this bot depends on.

pub mod calendar;
pub mod matcher;

pub use calendar::{CalendarSource, HttpCalendarSource};
pub use matcher::{HttpSubscriberMatcher, SubscriberMatcher};
