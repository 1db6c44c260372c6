//! Normalizes AWS Lambda trigger envelopes into typed request events, dispatches them to a
//! named service and strips the response down to the fields the invoking platform accepts.
//!
//! raw bytes -> [envelope] -> [dispatch] -> [service] -> [sanitize] -> raw bytes,
//! all driven by [adapter::Adapter].

pub mod adapter;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod event;
pub mod properties;
pub mod sanitize;
pub mod service;
pub mod services;

pub use adapter::Adapter;
pub use error::{AdapterError, Result};
