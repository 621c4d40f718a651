//! Record types handed to consumers.
//!
//! This module defines the records produced by the decode loop:
//! - [`Entry`]: one `<url>` element of a sitemap
//! - [`Image`]: one `<image:image>` extension element inside a `<url>`
//! - [`News`]: the `<news:news>` extension element inside a `<url>`
//! - [`IndexEntry`]: one `<sitemap>` element of a sitemap index
//!
//! Records are filled in by the builders in [`crate::decoder`] and are
//! read-only afterwards. Date fields keep the raw string from the document and
//! parse it on first access; the parsed value is cached on the record.

use crate::dates::parse_date_time;
use chrono::{DateTime, FixedOffset};
use once_cell::unsync::OnceCell;

/// How often a page is expected to change.
///
/// Sitemaps carry this as free text. The decoder passes through whatever the
/// document says, so values outside this set can reach consumers.
pub mod frequency {
    /// The page changes every time it is accessed. Default when absent.
    pub const ALWAYS: &str = "always";
    /// The page changes every hour.
    pub const HOURLY: &str = "hourly";
    /// The page changes every day.
    pub const DAILY: &str = "daily";
    /// The page changes every week.
    pub const WEEKLY: &str = "weekly";
    /// The page changes every month.
    pub const MONTHLY: &str = "monthly";
    /// The page changes every year.
    pub const YEARLY: &str = "yearly";
    /// The page is archived and never changes.
    pub const NEVER: &str = "never";
}

/// Priority used when a `<url>` has no usable `<priority>`.
pub const DEFAULT_PRIORITY: f32 = 0.5;

/// Raw date text plus its lazily parsed form.
#[derive(Debug, Default)]
pub(crate) struct LazyDate {
    raw: String,
    parsed: OnceCell<Option<DateTime<FixedOffset>>>,
}

impl LazyDate {
    pub(crate) fn new(raw: String) -> Self {
        Self {
            raw,
            parsed: OnceCell::new(),
        }
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn get(&self) -> Option<DateTime<FixedOffset>> {
        *self.parsed.get_or_init(|| parse_date_time(&self.raw))
    }
}

/// A page listed in a sitemap.
///
/// # Defaults
///
/// * `change_frequency` - [`frequency::ALWAYS`] when the element is absent
/// * `priority` - [`DEFAULT_PRIORITY`] when absent or not a number
/// * `last_modified` - `None` when absent or unparseable
///
/// A record whose `<loc>` is missing is still delivered, with an empty
/// location. Consumers should treat such a record as unusable.
#[derive(Debug)]
pub struct Entry {
    pub(crate) location: String,
    pub(crate) last_modified: LazyDate,
    pub(crate) change_frequency: String,
    pub(crate) priority: f32,
    pub(crate) images: Vec<Image>,
    pub(crate) news: Option<News>,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            location: String::new(),
            last_modified: LazyDate::default(),
            change_frequency: frequency::ALWAYS.to_string(),
            priority: DEFAULT_PRIORITY,
            images: Vec::new(),
            news: None,
        }
    }
}

impl Entry {
    /// URL of the page.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Date of last modification, parsed on first call and cached.
    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.last_modified.get()
    }

    /// The `<lastmod>` text exactly as found (trimmed), empty when absent.
    pub fn raw_last_modified(&self) -> &str {
        self.last_modified.raw()
    }

    /// How frequently the page changes. See [`frequency`].
    pub fn change_frequency(&self) -> &str {
        &self.change_frequency
    }

    /// Priority of the page relative to the rest of the site.
    ///
    /// Valid documents use 0.0 to 1.0; the value is not clamped.
    pub fn priority(&self) -> f32 {
        self.priority
    }

    /// Images attached to the page, in document order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// News metadata, if the page is a news article.
    pub fn news(&self) -> Option<&News> {
        self.news.as_ref()
    }
}

/// An image attached to a sitemap [`Entry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub(crate) location: String,
    pub(crate) title: Option<String>,
}

impl Image {
    /// URL of the image.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Title of the image, if given.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Google News metadata attached to a sitemap [`Entry`].
#[derive(Debug, Default)]
pub struct News {
    pub(crate) publication_name: String,
    pub(crate) publication_language: String,
    pub(crate) publication_date: LazyDate,
    pub(crate) title: String,
    pub(crate) keywords: String,
}

impl News {
    /// Name of the publication (`<news:publication><news:name>`).
    pub fn publication_name(&self) -> &str {
        &self.publication_name
    }

    /// Language of the publication (`<news:publication><news:language>`).
    pub fn publication_language(&self) -> &str {
        &self.publication_language
    }

    /// Publication date of the article, parsed on first call and cached.
    pub fn publication_date(&self) -> Option<DateTime<FixedOffset>> {
        self.publication_date.get()
    }

    /// The `<news:publication_date>` text exactly as found, empty when absent.
    pub fn raw_publication_date(&self) -> &str {
        self.publication_date.raw()
    }

    /// Title of the article.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Comma separated keywords, as written in the document.
    pub fn keywords(&self) -> &str {
        &self.keywords
    }
}

/// A sitemap referenced from a sitemap index.
#[derive(Debug, Default)]
pub struct IndexEntry {
    pub(crate) location: String,
    pub(crate) last_modified: LazyDate,
}

impl IndexEntry {
    /// URL of the referenced sitemap.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Date of last modification of the referenced sitemap, parsed on first
    /// call and cached.
    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.last_modified.get()
    }

    /// The `<lastmod>` text exactly as found (trimmed), empty when absent.
    pub fn raw_last_modified(&self) -> &str {
        self.last_modified.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_defaults() {
        let entry = Entry::default();
        assert_eq!(entry.location(), "");
        assert_eq!(entry.change_frequency(), frequency::ALWAYS);
        assert_eq!(entry.priority(), 0.5);
        assert!(entry.last_modified().is_none());
        assert!(entry.images().is_empty());
        assert!(entry.news().is_none());
    }

    #[test]
    fn test_last_modified_is_cached() {
        let entry = Entry {
            last_modified: LazyDate::new("2015-05-07T15:04:05Z".to_string()),
            ..Entry::default()
        };
        assert!(entry.last_modified.parsed.get().is_none());

        let first = entry.last_modified();
        assert!(entry.last_modified.parsed.get().is_some());
        let second = entry.last_modified();
        assert_eq!(first, second);
        assert_eq!(first.unwrap().to_rfc3339(), "2015-05-07T15:04:05+00:00");
    }

    #[test]
    fn test_bad_date_is_cached_as_absent() {
        let entry = IndexEntry {
            location: "https://example.com/sitemap1.xml".to_string(),
            last_modified: LazyDate::new("yesterday".to_string()),
        };
        assert!(entry.last_modified().is_none());
        assert_eq!(entry.last_modified.parsed.get(), Some(&None));
        assert_eq!(entry.raw_last_modified(), "yesterday");
    }

    #[test]
    fn test_news_publication_date() {
        let news = News {
            publication_name: "The Example Times".to_string(),
            publication_language: "en".to_string(),
            publication_date: LazyDate::new("2008-12-23".to_string()),
            title: "Companies A, B in Merger Talks".to_string(),
            keywords: "business, merger".to_string(),
        };
        let date = news.publication_date().unwrap();
        assert_eq!(date.to_rfc3339(), "2008-12-23T00:00:00+00:00");
        assert_eq!(news.publication_date(), Some(date));
    }

    #[test]
    fn test_image_title_optional() {
        let image = Image {
            location: "https://example.com/image.jpg".to_string(),
            title: None,
        };
        assert_eq!(image.location(), "https://example.com/image.jpg");
        assert!(image.title().is_none());
    }
}
