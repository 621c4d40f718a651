//! JSON Lines output.
//!
//! Records are borrowed views over [`Entry`] and [`IndexEntry`], serialized
//! with `serde_json` straight to the writer. Dates are rendered as RFC 3339,
//! or `null` when absent or unparseable.

use serde::Serialize;
use sitemap_stream::{Entry, Image, IndexEntry, News};
use std::io::{self, Write};

/// A record that can be written as a single JSON line.
pub trait JsonLine {
    /// Serialize `self` followed by a newline.
    fn write_json_line<W: Write>(&self, out: &mut W) -> io::Result<()>;
}

#[derive(Serialize)]
struct EntryLine<'a> {
    location: &'a str,
    last_modified: Option<String>,
    change_frequency: &'a str,
    priority: f32,
    images: Vec<ImageLine<'a>>,
    news: Option<NewsLine<'a>>,
}

#[derive(Serialize)]
struct ImageLine<'a> {
    location: &'a str,
    title: Option<&'a str>,
}

#[derive(Serialize)]
struct NewsLine<'a> {
    publication_name: &'a str,
    publication_language: &'a str,
    publication_date: Option<String>,
    title: &'a str,
    keywords: &'a str,
}

#[derive(Serialize)]
struct IndexEntryLine<'a> {
    location: &'a str,
    last_modified: Option<String>,
}

impl<'a> From<&'a Image> for ImageLine<'a> {
    fn from(image: &'a Image) -> Self {
        Self {
            location: image.location(),
            title: image.title(),
        }
    }
}

impl<'a> From<&'a News> for NewsLine<'a> {
    fn from(news: &'a News) -> Self {
        Self {
            publication_name: news.publication_name(),
            publication_language: news.publication_language(),
            publication_date: news.publication_date().map(|d| d.to_rfc3339()),
            title: news.title(),
            keywords: news.keywords(),
        }
    }
}

fn write_line<W: Write, T: Serialize>(out: &mut W, line: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    out.write_all(b"\n")
}

impl JsonLine for Entry {
    fn write_json_line<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let line = EntryLine {
            location: self.location(),
            last_modified: self.last_modified().map(|d| d.to_rfc3339()),
            change_frequency: self.change_frequency(),
            priority: self.priority(),
            images: self.images().iter().map(ImageLine::from).collect(),
            news: self.news().map(NewsLine::from),
        };
        write_line(out, &line)
    }
}

impl JsonLine for IndexEntry {
    fn write_json_line<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let line = IndexEntryLine {
            location: self.location(),
            last_modified: self.last_modified().map(|d| d.to_rfc3339()),
        };
        write_line(out, &line)
    }
}
