//! Command-line interface definitions for the `sitemap_stream` binary.
//!
//! All retrieval options can be provided via command-line flags, environment
//! variables, or a YAML config file (flags win).

use clap::Parser;
use sitemap_stream::{ConfigError, FetchConfig};
use std::path::Path;
use url::Url;

/// Stream a sitemap or sitemap index and print one JSON line per record.
///
/// # Examples
///
/// ```sh
/// # Local sitemap
/// sitemap_stream ./sitemap.xml
///
/// # Remote sitemap index, first 10 entries only
/// sitemap_stream --index --limit 10 https://example.com/sitemap_index.xml
///
/// # Custom user-agent
/// SITEMAP_USER_AGENT="MyBot/1.0" sitemap_stream https://example.com/sitemap.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Sitemap file path or http(s) URL
    pub target: String,

    /// Parse the document as a sitemap index (<sitemap> records)
    #[arg(short, long)]
    pub index: bool,

    /// Stop after this many records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// User-Agent header for remote sitemaps
    #[arg(long, env = "SITEMAP_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds for remote sitemaps
    #[arg(long, env = "SITEMAP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Where the sitemap comes from.
#[derive(Debug, PartialEq, Eq)]
pub enum Target<'a> {
    /// Remote http(s) URL.
    Remote(&'a str),
    /// Local file.
    File(&'a Path),
}

impl Cli {
    /// Classify the positional target. Anything that is not an http(s) URL
    /// is treated as a file path.
    pub fn target(&self) -> Target<'_> {
        match Url::parse(&self.target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Target::Remote(&self.target),
            _ => Target::File(Path::new(&self.target)),
        }
    }

    /// Merge the config file (if any) with flag overrides.
    pub fn fetch_config(&self) -> Result<FetchConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::from_yaml_file(path)?,
            None => FetchConfig::default(),
        };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = Some(timeout_secs);
        }
        Ok(config)
    }
}
