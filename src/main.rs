//! # sitemap_stream
//!
//! Command-line front end for the `sitemap_stream` library: reads a sitemap
//! or sitemap index from a file or URL and prints one JSON line per record
//! on stdout. Logs go to stderr.
//!
//! ## Usage
//!
//! ```sh
//! sitemap_stream ./sitemap.xml
//! sitemap_stream --index https://example.com/sitemap_index.xml
//! RUST_LOG=debug sitemap_stream --limit 5 https://example.com/sitemap.xml
//! ```

use clap::Parser;
use sitemap_stream::{
    Entry, Error as SitemapError, FetchConfig, Fetcher, IndexEntry, parse_entries_from_file,
    parse_index_entries_from_file,
};
use std::error::Error;
use std::io::{self, Write};
use thiserror::Error as ThisError;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod outputs;

use cli::{Cli, Target};
use outputs::json::JsonLine;

/// Why the consumer stopped the parse early.
#[derive(Debug, ThisError)]
enum Stop {
    #[error("record limit of {0} reached")]
    Limit(usize),
    #[error("failed writing output: {0}")]
    Output(#[from] io::Error),
}

/// Build a consumer that prints each record and stops after `limit` records.
fn printer<'a, T, W>(
    out: &'a mut W,
    count: &'a mut usize,
    limit: Option<usize>,
) -> impl FnMut(&T) -> Result<(), Stop> + 'a
where
    T: JsonLine,
    W: Write,
{
    move |record: &T| {
        if let Some(limit) = limit.filter(|&limit| *count >= limit) {
            return Err(Stop::Limit(limit));
        }
        record.write_json_line(out)?;
        *count += 1;
        match limit {
            Some(limit) if *count >= limit => Err(Stop::Limit(limit)),
            _ => Ok(()),
        }
    }
}

#[instrument(level = "info", skip_all, fields(target = %args.target, index = args.index))]
async fn run(
    args: &Cli,
    config: &FetchConfig,
    out: &mut impl Write,
    count: &mut usize,
) -> Result<(), SitemapError<Stop>> {
    match (args.target(), args.index) {
        (Target::File(path), false) => {
            parse_entries_from_file(path, printer::<Entry, _>(out, count, args.limit))
        }
        (Target::File(path), true) => {
            parse_index_entries_from_file(path, printer::<IndexEntry, _>(out, count, args.limit))
        }
        (Target::Remote(url), index) => {
            let fetcher = Fetcher::new(config)?;
            let cancel = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            if index {
                fetcher
                    .parse_index_entries_from_site(
                        url,
                        cancel,
                        printer::<IndexEntry, _>(out, count, args.limit),
                    )
                    .await
            } else {
                fetcher
                    .parse_entries_from_site(url, cancel, printer::<Entry, _>(out, count, args.limit))
                    .await
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match args.fetch_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load config");
            return Err(e.into());
        }
    };
    debug!(?config, "Resolved fetch config");

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut count = 0usize;

    let result = run(&args, &config, &mut out, &mut count).await;
    out.flush()?;

    let elapsed = start_time.elapsed();
    match result {
        Ok(()) => {}
        Err(SitemapError::Stopped(Stop::Limit(limit))) => {
            info!(limit, "Stopped at record limit");
        }
        Err(SitemapError::Stopped(Stop::Output(e))) => {
            error!(error = %e, records = count, "Failed writing output");
            return Err(e.into());
        }
        Err(e) => {
            error!(error = %e, records = count, "Sitemap parsing failed");
            return Err(e.into());
        }
    }

    info!(
        records = count,
        ?elapsed,
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );
    Ok(())
}
