//! crt.sh certificate-transparency search.
//!
//! Scrapes the HTML results page for `?q=%.example.com`. The page carries a
//! layout table followed by the results table; each result row lists the
//! certificate names in its fifth cell, one per line.

use crate::adapters::http::fetch_text;
use crate::domain::model::{Discoveries, Domain, SourceError, SourceKind};
use crate::domain::ports::SourceAdapter;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};

pub const DEFAULT_ENDPOINT: &str = "https://crt.sh/";

const RESULTS_TABLE: usize = 1;
const NAME_COLUMN: usize = 4;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));

pub struct CrtShSource {
    client: Client,
    endpoint: String,
}

impl CrtShSource {
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for CrtShSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Crtsh
    }

    async fn fetch(&self, domain: &Domain) -> Result<Discoveries, SourceError> {
        let query = format!("%.{}", domain);
        let request = self.client.get(&self.endpoint).query(&[("q", query.as_str())]);

        let body = fetch_text(request).await?;
        let names = parse_names(&body)?;
        tracing::debug!("crt.sh returned {} names for {}", names.len(), domain);

        Ok(Discoveries::from_names(names))
    }
}

/// Pulls certificate names out of the results table, header row skipped, wildcards stripped.
pub fn parse_names(body: &str) -> Result<Vec<String>, SourceError> {
    if body.trim().is_empty() {
        return Err(SourceError::Throttled("empty payload".to_string()));
    }

    let document = Html::parse_document(body);
    let table = document
        .select(&TABLE)
        .nth(RESULTS_TABLE)
        .ok_or_else(|| SourceError::Parse("results table missing".to_string()))?;

    let mut names = Vec::new();
    for row in table.select(&ROW).skip(1) {
        let Some(cell) = row.select(&CELL).nth(NAME_COLUMN) else {
            continue;
        };

        // <br> 分隔多個名稱
        for fragment in cell.text() {
            names.extend(
                fragment
                    .split_whitespace()
                    .map(|name| name.trim_start_matches("*.").to_string())
                    .filter(|name| !name.is_empty()),
            );
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{build_client, DEFAULT_USER_AGENT};
    use httpmock::prelude::*;
    use std::time::Duration;

    const RESULTS_PAGE: &str = r#"
<html><body>
<table><tr><td class="outer">
  <table>
    <tr><th>crt.sh ID</th><th>Logged At</th><th>Not Before</th><th>Not After</th><th>Common Name</th><th>Matching Identities</th></tr>
    <tr><td>1</td><td>2024-01-01</td><td>2024-01-01</td><td>2024-04-01</td><td>www.example.com</td><td>www.example.com</td></tr>
    <tr><td>2</td><td>2024-01-02</td><td>2024-01-02</td><td>2024-04-02</td><td>*.api.example.com</td><td>*.api.example.com</td></tr>
    <tr><td>3</td><td>2024-01-03</td><td>2024-01-03</td><td>2024-04-03</td><td>mail.example.com<br>smtp.example.com</td><td>x</td></tr>
    <tr><td colspan="6">truncated</td></tr>
  </table>
</td></tr></table>
</body></html>"#;

    #[test]
    fn test_parse_names_reads_name_column() {
        let names = parse_names(RESULTS_PAGE).unwrap();
        assert_eq!(
            names,
            vec![
                "www.example.com",
                "api.example.com",
                "mail.example.com",
                "smtp.example.com"
            ]
        );
    }

    #[test]
    fn test_parse_names_without_results_table() {
        let page = "<html><body><table><tr><td>Certificates None found</td></tr></table></body></html>";
        assert!(matches!(parse_names(page), Err(SourceError::Parse(_))));
        assert!(matches!(parse_names(""), Err(SourceError::Throttled(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_wildcard_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/").query_param("q", "%.example.com");
                then.status(200)
                    .header("Content-Type", "text/html")
                    .body(RESULTS_PAGE);
            })
            .await;

        let client = build_client(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();
        let source = CrtShSource::with_endpoint(client, server.url("/"));
        let domain = Domain::parse("example.com").unwrap();

        let found = source.fetch(&domain).await.unwrap();

        mock.assert_async().await;
        assert_eq!(found.len(), 4);
    }
}
