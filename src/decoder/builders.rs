//! Record builders for sitemap and sitemap-index documents.
//!
//! Each builder walks exactly one record element. Recognized children fill
//! fields; anything else is drained and ignored. Missing children leave the
//! defaults documented on the record types.

use super::{ElementStart, RecordHandler, TokenStream};
use crate::error::DecodeError;
use crate::models::{Entry, Image, IndexEntry, LazyDate, News};
use std::io::BufRead;
use tracing::warn;

/// Builds an [`Entry`] from each `<url>` element.
#[derive(Debug)]
pub struct EntryHandler;

impl RecordHandler for EntryHandler {
    const RECORD_TAG: &'static str = "url";
    type Record = Entry;

    fn build<R: BufRead>(
        stream: &mut TokenStream<R>,
        start: &ElementStart,
    ) -> Result<Entry, DecodeError> {
        let mut entry = Entry::default();

        stream.for_each_child(start, |stream, child| {
            match child.name.as_str() {
                "loc" => entry.location = stream.read_text(&child)?,
                "lastmod" => entry.last_modified = LazyDate::new(stream.read_text(&child)?),
                "changefreq" => {
                    let value = stream.read_text(&child)?;
                    if !value.is_empty() {
                        entry.change_frequency = value;
                    }
                }
                "priority" => {
                    let value = stream.read_text(&child)?;
                    match value.parse::<f32>() {
                        Ok(priority) => entry.priority = priority,
                        Err(e) if !value.is_empty() => {
                            warn!(value = %value, error = %e, "Ignoring unparseable priority")
                        }
                        Err(_) => {}
                    }
                }
                "image" => entry.images.push(build_image(stream, &child)?),
                "news" => entry.news = Some(build_news(stream, &child)?),
                _ => stream.skip(&child)?,
            }
            Ok(())
        })?;

        Ok(entry)
    }
}

/// Builds an [`IndexEntry`] from each `<sitemap>` element.
#[derive(Debug)]
pub struct IndexEntryHandler;

impl RecordHandler for IndexEntryHandler {
    const RECORD_TAG: &'static str = "sitemap";
    type Record = IndexEntry;

    fn build<R: BufRead>(
        stream: &mut TokenStream<R>,
        start: &ElementStart,
    ) -> Result<IndexEntry, DecodeError> {
        let mut entry = IndexEntry::default();

        stream.for_each_child(start, |stream, child| {
            match child.name.as_str() {
                "loc" => entry.location = stream.read_text(&child)?,
                "lastmod" => entry.last_modified = LazyDate::new(stream.read_text(&child)?),
                _ => stream.skip(&child)?,
            }
            Ok(())
        })?;

        Ok(entry)
    }
}

fn build_image<R: BufRead>(
    stream: &mut TokenStream<R>,
    start: &ElementStart,
) -> Result<Image, DecodeError> {
    let mut image = Image::default();

    stream.for_each_child(start, |stream, child| {
        match child.name.as_str() {
            "loc" => image.location = stream.read_text(&child)?,
            "title" => {
                let title = stream.read_text(&child)?;
                image.title = (!title.is_empty()).then_some(title);
            }
            _ => stream.skip(&child)?,
        }
        Ok(())
    })?;

    Ok(image)
}

fn build_news<R: BufRead>(
    stream: &mut TokenStream<R>,
    start: &ElementStart,
) -> Result<News, DecodeError> {
    let mut news = News::default();

    stream.for_each_child(start, |stream, child| {
        match child.name.as_str() {
            "publication" => stream.for_each_child(&child, |stream, field| {
                match field.name.as_str() {
                    "name" => news.publication_name = stream.read_text(&field)?,
                    "language" => news.publication_language = stream.read_text(&field)?,
                    _ => stream.skip(&field)?,
                }
                Ok(())
            })?,
            "publication_date" => {
                news.publication_date = LazyDate::new(stream.read_text(&child)?)
            }
            "title" => news.title = stream.read_text(&child)?,
            "keywords" => news.keywords = stream.read_text(&child)?,
            _ => stream.skip(&child)?,
        }
        Ok(())
    })?;

    Ok(news)
}
