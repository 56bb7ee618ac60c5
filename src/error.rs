//! Error handling and custom error types
//!
//! Provides unified error handling across the console using thiserror.
//! Every variant is scoped to a single image or a single login attempt;
//! nothing here is fatal to the process once the server is running.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Detection service error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Email or password are incorrect.")]
    Auth,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
