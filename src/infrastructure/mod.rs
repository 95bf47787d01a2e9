//! Infrastructure layer providing external service integrations.
//!
//! This module contains the HTTP adapter for the customer endpoint, the
//! worker dispatch that keeps network calls off the UI thread, CSV export,
//! configuration and logging setup.

pub mod config;
pub mod dispatch;
pub mod export;
pub mod http;
pub mod logging;

pub use config::*;
pub use dispatch::*;
pub use export::*;
pub use http::*;
pub use logging::*;
