use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialerError {
    #[error("Terminal initialization failed: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid backend URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, DialerError>;
