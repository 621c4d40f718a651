//! Byte sources for the decode loop: local files and remote URLs.
//!
//! Remote sitemaps are fetched with `reqwest`. The client sends a fixed
//! user-agent and, through reqwest's `gzip` feature, transparently decodes
//! responses served with `Content-Encoding: gzip`.
//!
//! A response body is never collected. It is read one network chunk at a
//! time by the decode loop, which runs on a blocking thread and hands each
//! record back to the caller's task before reading further.
//!
//! # Cancellation
//!
//! Dropping a parse future cancels it. The `*_from_site` methods also accept
//! any future as a cancellation signal (a `oneshot` receiver, a `Notify`, a
//! `sleep`) and fail with [`FetchError::Cancelled`] when it completes before
//! the document has been fully parsed.

use crate::config::FetchConfig;
use crate::decoder::{RecordHandler, decode_records};
use crate::error::{DecodeError, Error, FetchError};
use reqwest::{Client, Response};
use std::fs::File;
use std::future::Future;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::mpsc as sync_mpsc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Open a local sitemap for buffered reading.
///
/// The handle closes when the returned reader is dropped, on every exit path
/// of the caller.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn open_file(path: impl AsRef<Path>) -> Result<BufReader<File>, FetchError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FetchError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Opened sitemap file");
    Ok(BufReader::new(file))
}

/// HTTP client for downloading sitemaps.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a client from `config`.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Request the sitemap at `url` and return the response once its headers
    /// are in. The body has not been read yet.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `url` does not parse
    /// - [`FetchError::Request`] on network or TLS failure
    /// - [`FetchError::Status`] for any status code of 400 or above
    #[instrument(level = "info", skip(self))]
    pub async fn open(&self, url: &str) -> Result<Response, FetchError> {
        let target = Url::parse(url)?;

        let response = self.client.get(target).send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            warn!(status = status.as_u16(), "Sitemap request rejected");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(
            status = status.as_u16(),
            content_length = ?response.content_length(),
            "Sitemap response received"
        );
        Ok(response)
    }

    /// Like [`Fetcher::open`], but gives up as soon as `cancel` completes.
    pub async fn open_with_cancel<C>(&self, url: &str, cancel: C) -> Result<Response, FetchError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            res = self.open(url) => res,
            _ = cancel => {
                warn!(%url, "Sitemap request cancelled");
                Err(FetchError::Cancelled { url: url.to_string() })
            }
        }
    }

    /// Stream the document at `url` through the decode loop for `H`.
    ///
    /// The loop runs on a blocking thread and sends each record here, where
    /// `consumer` sees it; it then waits for the go-ahead before reading the
    /// next token. A consumer `Err` or a fired `cancel` therefore stops all
    /// reading at the current record boundary.
    pub(crate) async fn parse_site<H, C, F, E>(
        &self,
        url: &str,
        cancel: C,
        mut consumer: F,
    ) -> Result<(), Error<E>>
    where
        H: RecordHandler + 'static,
        H::Record: Send + 'static,
        C: Future<Output = ()>,
        F: FnMut(&H::Record) -> Result<(), E>,
    {
        let t0 = Instant::now();
        tokio::pin!(cancel);
        let response = self.open_with_cancel(url, cancel.as_mut()).await?;

        let body = BodyReader::new(response, Handle::current());
        let (record_tx, mut record_rx) = mpsc::channel::<H::Record>(1);
        let (resume_tx, resume_rx) = sync_mpsc::channel::<()>();
        let reader = tokio::task::spawn_blocking(move || {
            decode_records::<H, _, _, _>(body, |record| {
                record_tx.blocking_send(record).map_err(|_| Detached)?;
                resume_rx.recv().map_err(|_| Detached)
            })
        });

        let mut records = 0usize;
        loop {
            let record = tokio::select! {
                biased;
                _ = cancel.as_mut() => {
                    warn!(%url, records, "Sitemap parse cancelled");
                    return Err(FetchError::Cancelled { url: url.to_string() }.into());
                }
                record = record_rx.recv() => record,
            };
            let Some(record) = record else { break };
            records += 1;
            consumer(&record).map_err(Error::Stopped)?;
            // Fails only once the reader has already finished.
            let _ = resume_tx.send(());
        }

        match reader.await {
            Ok(Ok(())) => {
                info!(
                    records,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Parsed remote sitemap"
                );
                Ok(())
            }
            Ok(Err(Error::Decode(e))) => Err(Error::Decode(e)),
            Ok(Err(Error::Fetch(e))) => Err(Error::Fetch(e)),
            // The receiving side is still alive here, so the reader never
            // saw a detached channel.
            Ok(Err(Error::Stopped(Detached))) => Ok(()),
            Err(e) => Err(DecodeError::Xml(io::Error::other(e).into()).into()),
        }
    }
}

/// The caller's side of a remote parse went away.
#[derive(Debug)]
struct Detached;

/// Blocking [`BufRead`] over a response body, holding one chunk at a time.
///
/// Must be used off the async workers (inside `spawn_blocking`). Transport
/// and decompression failures surface as I/O errors, which the decode loop
/// reports as [`DecodeError::Xml`].
struct BodyReader {
    response: Response,
    handle: Handle,
    chunk: Vec<u8>,
    pos: usize,
    done: bool,
}

impl BodyReader {
    fn new(response: Response, handle: Handle) -> Self {
        Self {
            response,
            handle,
            chunk: Vec::new(),
            pos: 0,
            done: false,
        }
    }
}

impl Read for BodyReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for BodyReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.pos == self.chunk.len() && !self.done {
            match self
                .handle
                .block_on(self.response.chunk())
                .map_err(io::Error::other)?
            {
                Some(bytes) => {
                    self.chunk.clear();
                    self.chunk.extend_from_slice(&bytes);
                    self.pos = 0;
                }
                None => self.done = true,
            }
        }
        Ok(&self.chunk[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.chunk.len());
    }
}
