//! Article extraction from parsed HTML.
//!
//! Applies a [`SiteSpec`]'s selector rules to a fetched page and yields one
//! [`ArticleRecord`] per matched container element, in document order.
//! Extraction never fails the caller: a container with no usable title is
//! skipped, missing optional fields degrade to empty/absent values, and an
//! unparseable selector leaves the site contributing nothing beyond a
//! warning in the log.

use crate::dates;
use crate::models::{ArticleRecord, SiteSpec};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

/// Extract article records from raw page markup.
///
/// Returns records in the document order of their container elements; no
/// container contributes more than one record. Only a missing or empty
/// title drops a record — every other field degrades gracefully.
#[instrument(level = "debug", skip_all, fields(site = %spec.name))]
pub fn extract_articles(html: &str, spec: &SiteSpec) -> Vec<ArticleRecord> {
    let container = match Selector::parse(&spec.selectors.container) {
        Ok(sel) => sel,
        Err(e) => {
            warn!(site = %spec.name, selector = %spec.selectors.container, error = %e, "Bad container selector; site contributes no records");
            return Vec::new();
        }
    };
    let title = match Selector::parse(&spec.selectors.title) {
        Ok(sel) => sel,
        Err(e) => {
            warn!(site = %spec.name, selector = %spec.selectors.title, error = %e, "Bad title selector; site contributes no records");
            return Vec::new();
        }
    };
    let link = parse_optional(spec, "link", spec.selectors.link.as_deref());
    let date = parse_optional(spec, "date", spec.selectors.date.as_deref());
    let summary = parse_optional(spec, "summary", spec.selectors.summary.as_deref());

    let base_url = spec.base_url();
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for element in document.select(&container) {
        let title_text = first_text(element, &title);
        if title_text.is_empty() {
            debug!(site = %spec.name, "Container without title text; skipping");
            continue;
        }

        let link_href = link
            .as_ref()
            .and_then(|sel| element.select(sel).next())
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| resolve_link(base_url.as_ref(), href));

        let raw_date = date
            .as_ref()
            .map(|sel| first_text(element, sel))
            .unwrap_or_default();
        let sort_date = dates::normalize(&raw_date).unwrap_or_else(Utc::now);

        let summary_text = summary
            .as_ref()
            .map(|sel| first_text(element, sel))
            .unwrap_or_default();

        records.push(ArticleRecord {
            source: spec.name.clone(),
            title: title_text,
            link: link_href,
            raw_date,
            sort_date,
            summary: summary_text,
        });
    }

    debug!(site = %spec.name, count = records.len(), "Extracted records");
    records
}

/// Compile an optional field selector, demoting parse failures to
/// "not configured".
fn parse_optional(spec: &SiteSpec, field: &str, selector: Option<&str>) -> Option<Selector> {
    let raw = selector?.trim();
    if raw.is_empty() {
        return None;
    }
    match Selector::parse(raw) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(site = %spec.name, field, selector = raw, error = %e, "Bad optional selector; treating as not configured");
            None
        }
    }
}

/// Trimmed, whitespace-collapsed text of the first descendant match.
fn first_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Resolve an `href` against the site's base URL.
///
/// Absolute hrefs pass through unchanged; hrefs that cannot be resolved
/// yield no link rather than a malformed one.
fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Url::parse(href).ok().map(|u| u.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectorSpec;
    use chrono::{TimeZone, Utc};

    const PAGE: &str = r#"
        <html><body>
          <ul>
            <li class="item">
              <h2 class="headline">  First   story </h2>
              <a href="/articles/1">read</a>
              <span class="when">31/12/2023</span>
              <p class="teaser">Opening piece.</p>
            </li>
            <li class="item">
              <h2 class="headline"></h2>
              <a href="/articles/2">read</a>
            </li>
            <li class="item">
              <h2 class="headline">Third story</h2>
              <a href="https://elsewhere.org/3">read</a>
              <span class="when">gibberish</span>
            </li>
          </ul>
        </body></html>
    "#;

    fn spec() -> SiteSpec {
        SiteSpec {
            name: "Example".to_string(),
            url: "https://example.com/news".to_string(),
            selectors: SelectorSpec {
                container: "li.item".to_string(),
                title: "h2.headline".to_string(),
                link: Some("a".to_string()),
                date: Some("span.when".to_string()),
                summary: Some("p.teaser".to_string()),
            },
        }
    }

    #[test]
    fn test_extract_skips_empty_titles() {
        let records = extract_articles(PAGE, &spec());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.title.trim().is_empty()));
    }

    #[test]
    fn test_extract_preserves_document_order() {
        let records = extract_articles(PAGE, &spec());
        assert_eq!(records[0].title, "First story");
        assert_eq!(records[1].title, "Third story");
    }

    #[test]
    fn test_extract_collapses_title_whitespace() {
        let records = extract_articles(PAGE, &spec());
        assert_eq!(records[0].title, "First story");
    }

    #[test]
    fn test_extract_resolves_relative_links() {
        let records = extract_articles(PAGE, &spec());
        assert_eq!(
            records[0].link.as_deref(),
            Some("https://example.com/articles/1")
        );
        assert_eq!(records[1].link.as_deref(), Some("https://elsewhere.org/3"));
    }

    #[test]
    fn test_extract_parses_dates_with_fallback_to_now() {
        let before = Utc::now();
        let records = extract_articles(PAGE, &spec());

        assert_eq!(records[0].raw_date, "31/12/2023");
        assert_eq!(
            records[0].sort_date,
            Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap()
        );

        // Unparsable date text still yields a populated sort_date.
        assert_eq!(records[1].raw_date, "gibberish");
        assert!(records[1].sort_date >= before);
    }

    #[test]
    fn test_extract_optional_fields_degrade() {
        let mut s = spec();
        s.selectors.link = None;
        s.selectors.date = None;
        s.selectors.summary = None;

        let records = extract_articles(PAGE, &s);
        assert_eq!(records.len(), 2);
        assert!(records[0].link.is_none());
        assert!(records[0].raw_date.is_empty());
        assert!(records[0].summary.is_empty());
    }

    #[test]
    fn test_extract_summary_text() {
        let records = extract_articles(PAGE, &spec());
        assert_eq!(records[0].summary, "Opening piece.");
        assert_eq!(records[1].summary, "");
    }

    #[test]
    fn test_extract_bad_container_selector_is_empty() {
        let mut s = spec();
        s.selectors.container = "li.item[".to_string();
        assert!(extract_articles(PAGE, &s).is_empty());
    }

    #[test]
    fn test_extract_bad_optional_selector_degrades() {
        let mut s = spec();
        s.selectors.summary = Some("p[".to_string());
        let records = extract_articles(PAGE, &s);
        assert_eq!(records.len(), 2);
        assert!(records[0].summary.is_empty());
    }
}
