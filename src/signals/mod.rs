//! Trading signal fan-out to matched subscribers.

pub mod dispatcher;
pub mod format;

pub use dispatcher::SignalDispatcher;
pub use format::format_signal;
