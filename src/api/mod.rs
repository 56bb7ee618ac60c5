//! Browser-facing HTTP surface (axum)

pub mod forms;
pub mod routes;

pub use routes::{create_router, ConsoleState};
