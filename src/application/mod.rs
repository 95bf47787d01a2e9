//! Application layer managing query state and request sequencing.
//!
//! This module turns user intent into fetch requests, debounces search
//! input, and reconciles fetch outcomes with what is on screen.

pub mod coordinator;
pub mod debounce;
pub mod state;

pub use coordinator::*;
pub use debounce::*;
pub use state::*;
