//! Observability for the Inkwell API.
//!
//! This crate provides:
//! - `RequestId` - Per-request identifier, taken from `x-request-id` or generated
//! - `StructuredLogger` - Request-correlated access log lines (JSON or human)
//! - `init_tracing` - `tracing-subscriber` setup driven by `[logging]` config

mod logging;
mod request;
mod subscriber;

pub use logging::*;
pub use request::*;
pub use subscriber::*;
