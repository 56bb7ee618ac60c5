//! Demonstration console for the watch detection service
//!
//! Serves a login-gated web page where a user picks a detection method,
//! uploads watch photos and sees, per photo, the annotated images and
//! structured results returned by the external detection service.

pub mod api;
pub mod app;
pub mod codec;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod render;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
