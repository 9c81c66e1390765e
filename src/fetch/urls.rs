// src/fetch/urls.rs
use scraper::{Html, Selector};
use tracing::{info, instrument, trace, warn};
use url::Url;

use super::Source;
use crate::error::ScrapeError;

/// Fetch the listing page and return the archive links published for `year`.
///
/// An empty list is not an error: the listing simply has nothing for that year.
#[instrument(level = "info", skip(source))]
pub async fn discover_links<S: Source>(
    source: &S,
    listing_url: &str,
    year: u16,
) -> Result<Vec<String>, ScrapeError> {
    let page = source.get(listing_url).await?.error_for_status(listing_url)?;
    let html = String::from_utf8_lossy(&page.body);
    let links = parse_zip_links(&html, year);

    if links.is_empty() {
        warn!(year, "no archive links on listing page");
    } else {
        info!(year, count = links.len(), "discovered archive links");
    }
    Ok(links)
}

/// Collect the absolute `.zip` links inside the `n<year>` container.
/// Containers for other years are ignored.
pub fn parse_zip_links(html: &str, year: u16) -> Vec<String> {
    let container_id = format!("n{}", year);
    let with_id = Selector::parse("[id]").expect("CSS selector for ids should be valid");
    let anchors = Selector::parse("a[href]").expect("CSS selector for links should be valid");

    let doc = Html::parse_document(html);
    let mut links: Vec<String> = Vec::new();

    for container in doc
        .select(&with_id)
        .filter(|el| el.value().id() == Some(container_id.as_str()))
    {
        for href in container
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
        {
            if !is_external_zip(href) {
                trace!(href, "skipping link");
                continue;
            }
            if !links.iter().any(|l| l == href) {
                trace!(href, "found archive link");
                links.push(href.to_string());
            }
        }
    }

    links
}

fn is_external_zip(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.path().to_ascii_lowercase().contains(".zip")
        }
        Err(_) => false,
    }
}
