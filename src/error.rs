//! Error taxonomy for the scan engine.
//!
//! Every per-symbol and per-cycle error is recovered at the narrowest scope that
//! can still make progress. Only [`TransportError`] ends a connection, and nothing
//! here ever terminates the process.

use thiserror::Error;

/// Failure while fetching data from a market-data provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider payload: {0}")]
    Payload(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single symbol produced no scan result this cycle.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("{symbol}: insufficient history ({have} bars, need {need})")]
    DataUnavailable {
        symbol: String,
        have: usize,
        need: usize,
    },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Rejected reconfiguration request. Reported to the client; the previously
/// active strategy stays in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid parameters for {strategy}: {reason}")]
    InvalidParameters { strategy: String, reason: String },

    #[error("Malformed control message: {0}")]
    MalformedMessage(String),
}

/// Connection-level failure. Fatal to the connection only.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event channel closed")]
    ChannelClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(Box::new(err))
    }
}
