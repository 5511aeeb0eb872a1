//! VirusTotal public UI subdomain listing.
//!
//! API: https://www.virustotal.com/ui/domains/example.com/subdomains

use crate::adapters::http::fetch_text;
use crate::domain::model::{Discoveries, Domain, SourceError, SourceKind};
use crate::domain::ports::SourceAdapter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://www.virustotal.com/ui/domains";

#[derive(Debug, Deserialize)]
struct Listing {
    data: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
}

pub struct VirusTotalSource {
    client: Client,
    endpoint: String,
}

impl VirusTotalSource {
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for VirusTotalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Virustotal
    }

    async fn fetch(&self, domain: &Domain) -> Result<Discoveries, SourceError> {
        let url = format!(
            "{}/{}/subdomains",
            self.endpoint.trim_end_matches('/'),
            domain
        );

        let body = fetch_text(self.client.get(url)).await?;
        let names = parse_ids(&body)?;
        tracing::debug!("virustotal returned {} names for {}", names.len(), domain);

        Ok(Discoveries::from_names(names))
    }
}

pub fn parse_ids(body: &str) -> Result<Vec<String>, SourceError> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|_| SourceError::Throttled("no subdomain listing in payload".to_string()))?;

    Ok(listing.data.into_iter().map(|entry| entry.id).collect())
}
