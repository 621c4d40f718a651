//! Error types for sitemap parsing and retrieval.
//!
//! Three layers of failure exist:
//! - [`DecodeError`]: the byte stream is not well-formed XML, or it ends inside
//!   an open record.
//! - [`FetchError`]: the document could not be opened or downloaded. The decode
//!   loop never sees these.
//! - [`Error`]: what the public parse operations return. It wraps the two above
//!   and carries the consumer's own error untouched in [`Error::Stopped`].
//!
//! Unknown elements, missing optional fields and unparseable dates are not
//! errors at all; they resolve to documented defaults.

use std::path::PathBuf;
use thiserror::Error;

/// Structural failure reported by the decode loop or a record builder.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The tokenizer rejected the input (unterminated tag, mismatched end tag,
    /// bad encoding, ...).
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The input ended while a record element was still open.
    #[error("unexpected end of document inside <{tag}>")]
    UnexpectedEof {
        /// Local name of the element that was never closed.
        tag: String,
    },
}

impl From<quick_xml::encoding::EncodingError> for DecodeError {
    fn from(e: quick_xml::encoding::EncodingError) -> Self {
        DecodeError::Xml(e.into())
    }
}

/// Failure to produce a byte stream for the decode loop.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A local sitemap file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The target is neither a valid URL nor usable as one.
    #[error("invalid sitemap URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Network or TLS failure before the response headers arrived.
    #[error("sitemap request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a status code of 400 or above.
    #[error("sitemap error due to request {url} with response status code {status}")]
    Status {
        /// URL that was requested.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// The caller's cancellation signal fired before parsing finished.
    #[error("sitemap request to {url} was cancelled")]
    Cancelled {
        /// URL that was requested.
        url: String,
    },
}

/// Failure to load a [`crate::config::FetchConfig`] file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid YAML for the expected shape.
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result of a top-level parse operation.
///
/// `E` is the consumer's error type. When the consumer returns `Err(e)`, the
/// operation stops and returns `Error::Stopped(e)` holding that exact value.
#[derive(Error, Debug)]
pub enum Error<E> {
    /// The document could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The document is not well-formed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The consumer asked to stop.
    #[error("parsing stopped by consumer")]
    Stopped(E),
}

impl<E> Error<E> {
    /// The consumer's error, if the consumer is what stopped parsing.
    pub fn stopped(&self) -> Option<&E> {
        match self {
            Error::Stopped(e) => Some(e),
            _ => None,
        }
    }

    /// Take the consumer's error back out, if the consumer stopped parsing.
    pub fn into_stopped(self) -> Option<E> {
        match self {
            Error::Stopped(e) => Some(e),
            _ => None,
        }
    }
}
