//! Concurrent fan-out scraping across all configured sites.
//!
//! Every site is fetched and extracted as an independent task; the
//! orchestrator joins them all before merging, so one slow or failing site
//! only ever degrades its own contribution. Failures are logged exactly once
//! here, at the boundary, and become an empty record set for that site.

use crate::extract;
use crate::fetch::PageFetcher;
use crate::models::{ArticleRecord, SiteSpec};
use anyhow::Result;
use futures::future::join_all;
use tracing::{error, info, instrument};

/// Fetch and extract all sites concurrently, then merge.
///
/// The merged sequence is stable-sorted descending by `sort_date`; records
/// with equal timestamps keep site-input order, then document order. Waits
/// for every site task to settle before merging anything.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn scrape_all<F: PageFetcher>(sites: &[SiteSpec], fetcher: &F) -> Vec<ArticleRecord> {
    let outcomes = join_all(sites.iter().map(|site| scrape_site(site, fetcher))).await;

    let mut records = Vec::new();
    for (site, outcome) in sites.iter().zip(outcomes) {
        match outcome {
            Ok(found) => {
                info!(site = %site.name, count = found.len(), "Site scraped");
                records.extend(found);
            }
            Err(e) => {
                error!(site = %site.name, error = %e, "Site failed; contributing no records");
            }
        }
    }

    records.sort_by(|a, b| b.sort_date.cmp(&a.sort_date));
    info!(total = records.len(), "Merged scrape results");
    records
}

/// One site's fetch+extract task.
async fn scrape_site<F: PageFetcher>(site: &SiteSpec, fetcher: &F) -> Result<Vec<ArticleRecord>> {
    let html = fetcher.fetch(&site.url).await?;
    Ok(extract::extract_articles(&html, site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectorSpec;
    use anyhow::anyhow;
    use std::collections::HashMap;

    /// Fetcher serving canned documents; URLs outside the map fail.
    struct CannedFetcher {
        pages: HashMap<String, String>,
    }

    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("connection refused: {url}"))
        }
    }

    fn site(name: &str, url: &str) -> SiteSpec {
        SiteSpec {
            name: name.to_string(),
            url: url.to_string(),
            selectors: SelectorSpec {
                container: "li.item".to_string(),
                title: "h2".to_string(),
                link: Some("a".to_string()),
                date: Some("span.when".to_string()),
                summary: None,
            },
        }
    }

    fn page(entries: &[(&str, &str, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(title, href, when)| {
                format!(
                    "<li class=\"item\"><h2>{title}</h2><a href=\"{href}\"></a><span class=\"when\">{when}</span></li>"
                )
            })
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    #[tokio::test]
    async fn test_scrape_all_merges_sorted_descending() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://a.example/news".to_string(),
            page(&[("Older", "/a1", "01/03/2024"), ("Newest", "/a2", "03/03/2024")]),
        );
        pages.insert(
            "https://b.example/news".to_string(),
            page(&[("Middle", "/b1", "02/03/2024")]),
        );
        let fetcher = CannedFetcher { pages };

        let sites = [
            site("A", "https://a.example/news"),
            site("B", "https://b.example/news"),
        ];
        let records = scrape_all(&sites, &fetcher).await;

        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Newest", "Middle", "Older"]);
    }

    #[tokio::test]
    async fn test_scrape_all_ties_keep_input_order() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://a.example/news".to_string(),
            page(&[("From A", "/a1", "05/03/2024")]),
        );
        pages.insert(
            "https://b.example/news".to_string(),
            page(&[("From B", "/b1", "05/03/2024")]),
        );
        let fetcher = CannedFetcher { pages };

        let sites = [
            site("A", "https://a.example/news"),
            site("B", "https://b.example/news"),
        ];
        let records = scrape_all(&sites, &fetcher).await;

        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["From A", "From B"]);
    }

    #[tokio::test]
    async fn test_one_failing_site_leaves_others_intact() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://a.example/news".to_string(),
            page(&[("A story", "/a1", "01/03/2024")]),
        );
        pages.insert(
            "https://c.example/news".to_string(),
            page(&[("C story", "/c1", "02/03/2024")]),
        );
        let fetcher = CannedFetcher { pages };

        let sites = [
            site("A", "https://a.example/news"),
            site("B", "https://b.example/news"), // not served: fetch fails
            site("C", "https://c.example/news"),
        ];
        let records = scrape_all(&sites, &fetcher).await;

        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.source == "A"));
        assert!(records.iter().any(|r| r.source == "C"));
        assert!(records.iter().all(|r| r.source != "B"));
    }

    #[tokio::test]
    async fn test_empty_site_list_is_empty() {
        let fetcher = CannedFetcher { pages: HashMap::new() };
        assert!(scrape_all(&[], &fetcher).await.is_empty());
    }
}
