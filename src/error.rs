// src/error.rs
//! Error taxonomy for every backend operation.
//!
//! The `Display` output of each variant is the short message shown to the
//! user. Parser diagnostics and transport causes are kept out of it and only
//! reach the logs (or `std::error::Error::source`).

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input was insufficient; no request was attempted.
    #[error("{0}")]
    Validation(String),

    /// Connectivity absent, or the transport failed (DNS, refused, timeout).
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The backend answered with a status outside 200-299.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A body was mandatory but the backend sent none.
    #[error("{0}")]
    EmptyResponse(String),

    /// The body did not have the expected shape.
    #[error("{0}")]
    Decode(String),

    /// The request could not be built locally (e.g. unreadable source file).
    #[error("{message}")]
    Encoding {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Client-side watchdog fired before the flow completed.
    #[error("{0}")]
    Timeout(String),
}

impl ApiError {
    pub fn offline() -> Self {
        Self::Network {
            message: "No internet connection".to_string(),
            source: None,
        }
    }

    pub fn network(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn encoding(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Encoding {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status for server errors, `None` for everything else.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
