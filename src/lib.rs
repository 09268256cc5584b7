//! SigmaPips signal bot
//!
//! A chat bot that lets traders subscribe to (instrument, timeframe) pairs,
//! plus an HTTP service that fans trading signals out to matched subscribers.

pub mod bot;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
pub mod store;
pub mod transport;

pub use error::{Error, Result};
