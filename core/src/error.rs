//! Error types for the controller.
//!
//! # Design
//! Network outcomes never surface here: a failed or non-2xx round-trip is
//! collapsed into an absent response and delivered to observers. This enum
//! only covers mistakes the caller can act on before anything is sent, plus
//! the transport error a `Transport` implementation hands back to the
//! dispatcher.

/// Errors returned by the controller and by `Transport` implementations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `base_url + endpoint` did not parse as an absolute URL.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request parameters could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport could not complete the round-trip (connectivity, DNS,
    /// TLS, timeout, or no data returned).
    #[error("transport failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
