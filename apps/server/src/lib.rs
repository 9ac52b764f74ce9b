//! Lumen FHIR server library.
//!
//! The HTTP surface lives in [`api`], business logic in [`services`], and
//! storage in [`db`]. Payload classification for the `/Binary` endpoint is
//! provided by the `lumen-payload` crate.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{Error, Result};
