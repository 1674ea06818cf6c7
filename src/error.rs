use std::path::PathBuf;
use thiserror::Error;

/// The search page could not be obtained. Aborts the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("browser session failed: {0:#}")]
    Browser(anyhow::Error),

    #[error("results list did not appear within {timeout_secs}s: {reason}")]
    Timeout { timeout_secs: u64, reason: String },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("fetched page is empty")]
    EmptyPage,

    #[error("browser task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A single listing card could not be turned into a `Listing`
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("card {index}: missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("card {index}: invalid {field} {value:?}")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// An email could not be sent. The listing stays unseen.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// The seen-listings file could not be written. Aborts the run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to append to {}: {source}", .path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("PRICE_MIN ({min}) must not exceed PRICE_MAX ({max})")]
    PriceRange { min: u32, max: u32 },
}

/// Run-fatal failures of a fetch cycle
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
