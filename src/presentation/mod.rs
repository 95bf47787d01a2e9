//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the customer table using ratatui and maps
//! keyboard input onto controller operations.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
