//! Service wiring: HTTP surface and process runtime

pub mod http;
pub mod runtime;

pub use http::{create_router, start_server, AppState};
pub use runtime::{ServiceDeps, ServiceRuntime};
