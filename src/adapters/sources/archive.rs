//! Web archive CDX index source.
//!
//! API: http://web.archive.org/cdx/search/cdx?url=example.com/&matchType=domain&output=json&fl=original&collapse=urlkey
//! The archive returns one row per captured URL, so hosts repeat heavily and are
//! deduplicated here before reaching the aggregator.

use crate::adapters::http::fetch_text;
use crate::domain::model::{Discoveries, Domain, SourceError, SourceKind};
use crate::domain::ports::SourceAdapter;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeSet;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://web.archive.org/cdx/search/cdx";
const RESULT_LIMIT: &str = "500000";

pub struct ArchiveSource {
    client: Client,
    endpoint: String,
}

impl ArchiveSource {
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for ArchiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Archive
    }

    async fn fetch(&self, domain: &Domain) -> Result<Discoveries, SourceError> {
        let target = format!("{}/", domain);
        let request = self.client.get(&self.endpoint).query(&[
            ("url", target.as_str()),
            ("matchType", "domain"),
            ("output", "json"),
            ("fl", "original"),
            ("collapse", "urlkey"),
            ("limit", RESULT_LIMIT),
        ]);

        let body = fetch_text(request).await?;
        let hosts = parse_hosts(&body)?;
        tracing::debug!("archive returned {} unique hosts for {}", hosts.len(), domain);

        Ok(Discoveries::from_names(hosts))
    }
}

/// Extracts unique hosts from a CDX JSON payload (`[["original"], ["http://..."], ...]`).
pub fn parse_hosts(body: &str) -> Result<BTreeSet<String>, SourceError> {
    if body.trim().is_empty() {
        return Err(SourceError::Throttled("empty payload".to_string()));
    }

    let rows: Vec<Vec<String>> =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let hosts = rows
        .iter()
        .skip(1)
        .filter_map(|row| host_of(&row.concat()))
        .collect();

    Ok(hosts)
}

fn host_of(original: &str) -> Option<String> {
    let original = original.trim();
    if original.is_empty() {
        return None;
    }

    // 預設埠號 (http:80 / https:443) 由 url 自動省略
    match Url::parse(original) {
        Ok(url) => url.host_str().map(str::to_string),
        Err(_) => Some(original.to_string()),
    }
}
