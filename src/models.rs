//! Data models for site extraction rules and scraped articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SiteSpec`]: One configured source of articles and its selector rules
//! - [`SelectorSpec`]: The CSS selectors used to pull fields out of a page
//! - [`ArticleRecord`]: A single extracted article, as held in memory and
//!   persisted in the snapshot file
//!
//! `ArticleRecord` serializes with the field names `{source, title, link,
//! date, sortDate, summary}` so the snapshot file matches the layout written
//! by earlier versions of the watcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// CSS selectors describing where article fields live within a page.
///
/// `container` matches one element per article; the remaining selectors are
/// evaluated inside each container's subtree. Only `container` and `title`
/// are required — a site without usable links, dates, or summaries still
/// produces records.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorSpec {
    /// Selector matching one element per article entry.
    pub container: String,
    /// Selector for the title text inside a container.
    pub title: String,
    /// Selector for the element carrying the article `href`.
    #[serde(default)]
    pub link: Option<String>,
    /// Selector for the publication-date text.
    #[serde(default)]
    pub date: Option<String>,
    /// Selector for the summary/teaser text.
    #[serde(default)]
    pub summary: Option<String>,
}

/// One configured site to watch: a name, the page URL, and selector rules.
///
/// Constructed once from configuration at startup and immutable afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteSpec {
    /// Human-readable identifier, carried into each record's `source` field.
    pub name: String,
    /// Absolute URL of the page to fetch.
    pub url: String,
    /// Extraction rules for this page.
    pub selectors: SelectorSpec,
}

/// Validation failure for a [`SiteSpec`].
#[derive(Debug, PartialEq, Eq)]
pub enum SpecError {
    /// A mandatory selector (`container` or `title`) is empty.
    MissingField(&'static str),
    /// The site URL does not parse as an absolute URL.
    InvalidUrl(String),
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::MissingField(field) => {
                write!(f, "missing required selector field: {field}")
            }
            SpecError::InvalidUrl(url) => write!(f, "not an absolute URL: {url}"),
        }
    }
}

impl std::error::Error for SpecError {}

impl SiteSpec {
    /// Check that this spec is usable before any network activity.
    ///
    /// A spec is valid iff `container` and `title` are non-empty selector
    /// strings and `url` parses as an absolute URL. Pure; no side effects.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.selectors.container.trim().is_empty() {
            return Err(SpecError::MissingField("container"));
        }
        if self.selectors.title.trim().is_empty() {
            return Err(SpecError::MissingField("title"));
        }
        if Url::parse(&self.url).is_err() {
            return Err(SpecError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }

    /// The site URL parsed for resolving relative article links.
    ///
    /// Only meaningful after [`SiteSpec::validate`] has passed.
    pub fn base_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }
}

/// A single article extracted from a site.
///
/// Records are created by the extraction engine, one per matched container
/// element, and are immutable after creation. A record is only emitted when
/// its title is non-empty after trimming; `sort_date` is always populated,
/// falling back to the extraction instant when the source text carried no
/// parseable date.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ArticleRecord {
    /// Name of the site the record came from.
    pub source: String,
    /// Trimmed, non-empty title text.
    pub title: String,
    /// Absolute article URL, when the site's link selector produced one.
    #[serde(default)]
    pub link: Option<String>,
    /// The date text exactly as it appeared on the page (may be empty).
    #[serde(rename = "date", default)]
    pub raw_date: String,
    /// Canonical timestamp used for ordering; always present.
    #[serde(rename = "sortDate")]
    pub sort_date: DateTime<Utc>,
    /// Trimmed summary text, empty when not configured or not found.
    #[serde(default)]
    pub summary: String,
}

impl ArticleRecord {
    /// Identity key used for the new-vs-seen decision.
    ///
    /// Keyed on `link` when present. Records without a link fall back to
    /// `"{source}::{title}"` so they are still deduplicated across runs
    /// instead of being reported as new on every pass.
    pub fn identity_key(&self) -> String {
        match &self.link {
            Some(link) => link.clone(),
            None => format!("{}::{}", self.source, self.title),
        }
    }
}
