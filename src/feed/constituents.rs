//! S&P 500 constituent list
//!
//! Scraped from the Wikipedia constituents table. Share-class dots are
//! rewritten to the dash form the chart API expects (BRK.B becomes BRK-B).

use super::FeedError;
use crate::config::FeedConfig;
use crate::telemetry::{record_latency, LatencyMetric};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::{Duration, Instant};

/// Wikipedia page listing the current constituents
pub const SP500_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

const SYMBOL_HEADER: &str = "Symbol";

/// Downloads and parses the constituent list
pub struct ConstituentsFetcher {
    url: String,
    client: Client,
}

impl ConstituentsFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Build from the `[feed]` config section
    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        Self::new(
            config.constituents_url.clone(),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the page and return its ticker symbols in table order
    pub async fn fetch(&self) -> Result<Vec<String>, FeedError> {
        tracing::debug!(url = %self.url, "Fetching constituent list");

        let started = Instant::now();
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        record_latency(LatencyMetric::Fetch, started.elapsed());

        if !status.is_success() {
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }

        let symbols = parse_constituents(&body)?;
        tracing::info!(count = symbols.len(), "Fetched constituent list");
        Ok(symbols)
    }
}

/// Extract the `Symbol` column of the first table that has one.
///
/// The first row of each table is taken as its header.
pub fn parse_constituents(html: &str) -> Result<Vec<String>, FeedError> {
    let document = Html::parse_document(html);
    let tables = selector("table")?;
    let rows = selector("tr")?;
    let cells = selector("th, td")?;

    for table in document.select(&tables) {
        let mut table_rows = table.select(&rows);
        let Some(header) = table_rows.next() else {
            continue;
        };
        let Some(column) = header
            .select(&cells)
            .position(|cell| cell_text(cell) == SYMBOL_HEADER)
        else {
            continue;
        };

        let symbols: Vec<String> = table_rows
            .filter_map(|row| row.select(&cells).nth(column))
            .map(|cell| cell_text(cell).replace('.', "-"))
            .filter(|symbol| !symbol.is_empty())
            .collect();

        if symbols.is_empty() {
            return Err(FeedError::Html("constituent table has no rows".to_string()));
        }
        return Ok(symbols);
    }

    Err(FeedError::Html(format!("no table with a {} column", SYMBOL_HEADER)))
}

fn selector(css: &str) -> Result<Selector, FeedError> {
    Selector::parse(css).map_err(|e| FeedError::Html(e.to_string()))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
