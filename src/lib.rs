//! # sitemap_stream
//!
//! Streaming parser for [sitemaps.org](https://www.sitemaps.org/protocol.html)
//! sitemaps and sitemap indexes. Each `<url>` or `<sitemap>` record is built,
//! handed to a consumer callback, and dropped before the next one is read, so
//! memory use does not grow with the size of the document.
//!
//! ## Usage
//!
//! ```no_run
//! use sitemap_stream::{parse_entries_from_file, Error};
//!
//! let mut count = 0;
//! let result = parse_entries_from_file("sitemap.xml", |entry| {
//!     println!("{} {}", entry.location(), entry.priority());
//!     count += 1;
//!     if count == 100 { Err("enough") } else { Ok(()) }
//! });
//! match result {
//!     Ok(()) | Err(Error::Stopped("enough")) => {}
//!     Err(e) => eprintln!("sitemap failed: {e}"),
//! }
//! ```
//!
//! ## Architecture
//!
//! 1. **Retrieval** ([`fetch`]): open a file or download a URL
//! 2. **Decode loop** ([`decoder`]): find each record start tag
//! 3. **Builders** ([`decoder::builders`]): turn one record subtree into an
//!    [`Entry`] or [`IndexEntry`]
//! 4. **Consumer**: the caller's closure; returning `Err` stops parsing
//!
//! Elements the decoder does not know are skipped. Missing optional fields
//! take their documented defaults, and unparseable dates read as `None`.

pub mod config;
pub mod dates;
pub mod decoder;
pub mod error;
pub mod fetch;
pub mod models;

use decoder::{EntryHandler, IndexEntryHandler, decode_loop};
use std::future::{Future, pending};
use std::io::BufRead;
use std::path::Path;
use tracing::instrument;

pub use config::{FetchConfig, USER_AGENT};
pub use dates::parse_date_time;
pub use error::{ConfigError, DecodeError, Error, FetchError};
pub use fetch::Fetcher;
pub use models::{Entry, Image, IndexEntry, News, frequency};

/// Parse a sitemap from `reader`, calling `consumer` once per `<url>`.
///
/// Returns `Ok(())` after the whole document, [`Error::Stopped`] holding the
/// consumer's error if it returned one, or [`Error::Decode`] if the XML is
/// malformed.
pub fn parse_entries<R, F, E>(reader: R, consumer: F) -> Result<(), Error<E>>
where
    R: BufRead,
    F: FnMut(&Entry) -> Result<(), E>,
{
    decode_loop::<EntryHandler, _, _, _>(reader, consumer)
}

/// Parse a sitemap index from `reader`, calling `consumer` once per
/// `<sitemap>`.
pub fn parse_index_entries<R, F, E>(reader: R, consumer: F) -> Result<(), Error<E>>
where
    R: BufRead,
    F: FnMut(&IndexEntry) -> Result<(), E>,
{
    decode_loop::<IndexEntryHandler, _, _, _>(reader, consumer)
}

/// Read a sitemap from a local file. See [`parse_entries`].
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_entries_from_file<P, F, E>(path: P, consumer: F) -> Result<(), Error<E>>
where
    P: AsRef<Path>,
    F: FnMut(&Entry) -> Result<(), E>,
{
    parse_entries(fetch::open_file(path)?, consumer)
}

/// Read a sitemap index from a local file. See [`parse_index_entries`].
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_index_entries_from_file<P, F, E>(path: P, consumer: F) -> Result<(), Error<E>>
where
    P: AsRef<Path>,
    F: FnMut(&IndexEntry) -> Result<(), E>,
{
    parse_index_entries(fetch::open_file(path)?, consumer)
}

/// Download a sitemap with default settings and parse it. See
/// [`Fetcher::parse_entries_from_site`] for timeouts, cancellation or a custom
/// user-agent.
pub async fn parse_entries_from_site<F, E>(url: &str, consumer: F) -> Result<(), Error<E>>
where
    F: FnMut(&Entry) -> Result<(), E>,
{
    Fetcher::new(&FetchConfig::default())?
        .parse_entries_from_site(url, pending(), consumer)
        .await
}

/// Download a sitemap index with default settings and parse it.
pub async fn parse_index_entries_from_site<F, E>(url: &str, consumer: F) -> Result<(), Error<E>>
where
    F: FnMut(&IndexEntry) -> Result<(), E>,
{
    Fetcher::new(&FetchConfig::default())?
        .parse_index_entries_from_site(url, pending(), consumer)
        .await
}

impl Fetcher {
    /// Stream the sitemap at `url` record by record, unless `cancel`
    /// completes first. Records and errors are as for [`parse_entries`].
    #[instrument(level = "info", skip(self, cancel, consumer))]
    pub async fn parse_entries_from_site<C, F, E>(
        &self,
        url: &str,
        cancel: C,
        consumer: F,
    ) -> Result<(), Error<E>>
    where
        C: Future<Output = ()>,
        F: FnMut(&Entry) -> Result<(), E>,
    {
        self.parse_site::<EntryHandler, _, _, _>(url, cancel, consumer).await
    }

    /// Stream the sitemap index at `url` record by record, unless `cancel`
    /// completes first. Records and errors are as for [`parse_index_entries`].
    #[instrument(level = "info", skip(self, cancel, consumer))]
    pub async fn parse_index_entries_from_site<C, F, E>(
        &self,
        url: &str,
        cancel: C,
        consumer: F,
    ) -> Result<(), Error<E>>
    where
        C: Future<Output = ()>,
        F: FnMut(&IndexEntry) -> Result<(), E>,
    {
        self.parse_site::<IndexEntryHandler, _, _, _>(url, cancel, consumer).await
    }
}
