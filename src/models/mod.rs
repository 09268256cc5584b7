//! Shared data models.

pub mod calendar;
pub mod de;
pub mod preference;
pub mod signal;

pub use calendar::CalendarEvent;
pub use preference::{NewPreference, Preference, PreferenceId};
pub use signal::{
    ChatTarget, DispatchReport, MatchResponse, MatchedSubscriber, Signal, SignalValue,
};
