//! Error types for the Schemanav core library
//!
//! Every error here is recoverable from the host's point of view: the engine
//! reports it once through the warning channel and skips the document.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use schemanav_schemas::SchemaError;
use thiserror::Error;

/// Main error type for Schemanav engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP/Network related errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Redirect chain longer than the configured limit
    #[error("Too many redirects fetching {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: usize },

    /// Schema location with a scheme we cannot fetch
    #[error("Unsupported scheme '{scheme}' in {location}")]
    UnsupportedScheme { scheme: String, location: String },

    /// Schema reference that cannot be turned into a location
    #[error("Invalid schema reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    /// Schema bytes that are not UTF-8
    #[error("Schema at {location} is not valid UTF-8")]
    Utf8 {
        location: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Schema parsing and compilation errors
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn http(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Error::Http {
            message: message.into(),
            status_code,
            source: None,
        }
    }

    pub fn invalid_reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http {
            message: err.to_string(),
            status_code: err.status().map(|status| status.as_u16()),
            source: Some(err.into()),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}
