use std::fmt;

use thiserror::Error;

/// Failure while talking to the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidProxy,
    InvalidHeader,
    HttpStatus(u16),
    Timeout,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidProxy => write!(f, "invalid proxy"),
            FailureKind::InvalidHeader => write!(f, "invalid header"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A catalog page body that is not the expected JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed catalog page {page}: {message}")]
pub struct ParseError {
    pub page: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Failure while posting to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DeliveryError {
    pub kind: DeliveryFailure,
    pub message: String,
}

impl DeliveryError {
    pub(crate) fn new(kind: DeliveryFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    HttpStatus(u16),
    Timeout,
    Network,
    Encode,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::HttpStatus(code) => write!(f, "http status {code}"),
            DeliveryFailure::Timeout => write!(f, "timeout"),
            DeliveryFailure::Network => write!(f, "network error"),
            DeliveryFailure::Encode => write!(f, "payload encoding failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("catalog url must point at a products.json listing: {0}")]
    InvalidCatalogUrl(String),
}
