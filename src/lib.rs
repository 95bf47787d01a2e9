//! custview - Terminal Customer Browser Library
//!
//! Search, filter by age bracket and page through a remote customer
//! collection from the terminal, without ever showing a stale page.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
