// src/client/error.rs

use thiserror::Error;

/// Why an upstream call produced no value. Never escapes the web layer.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("body from {url} does not have the expected shape: {source}")]
    Shape {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("entry id {id:?} contains a relative path segment")]
    RelativeId { id: String },

    #[error("entry id {id:?} does not form a valid URL: {source}")]
    InvalidUrl {
        id: String,
        #[source]
        source: url::ParseError,
    },

    #[error("metadata for {id} unavailable, data request skipped: {source}")]
    MetadataUnavailable {
        id: String,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Classify a reqwest failure the same way `error_for_status` callers would.
    pub(crate) fn from_reqwest(url: &url::Url, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if let Some(status) = source.status() {
            FetchError::Status { url, status }
        } else if source.is_decode() {
            FetchError::Decode { url, source }
        } else {
            FetchError::Request { url, source }
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
