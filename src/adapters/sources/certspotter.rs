//! Cert Spotter issuance log.
//!
//! API: https://api.certspotter.com/v1/issuances?domain=example.com&include_subdomains=true&expand=dns_names
//! Free tier is heavily rate limited; a throttled reply comes back as a JSON
//! object instead of the usual array of issuances.

use crate::adapters::http::fetch_text;
use crate::domain::model::{Discoveries, Domain, SourceError, SourceKind};
use crate::domain::ports::SourceAdapter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://api.certspotter.com/v1/issuances";

#[derive(Debug, Deserialize)]
struct Issuance {
    #[serde(default)]
    dns_names: Vec<String>,
}

pub struct CertSpotterSource {
    client: Client,
    endpoint: String,
}

impl CertSpotterSource {
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for CertSpotterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Certspotter
    }

    async fn fetch(&self, domain: &Domain) -> Result<Discoveries, SourceError> {
        let request = self.client.get(&self.endpoint).query(&[
            ("domain", domain.as_str()),
            ("include_subdomains", "true"),
            ("expand", "dns_names"),
        ]);

        let body = fetch_text(request).await?;
        let names = parse_names(&body, domain)?;
        tracing::debug!("certspotter returned {} names for {}", names.len(), domain);

        Ok(Discoveries::from_names(names))
    }
}

/// Flattens every issuance's `dns_names`, keeping names that mention the target domain.
pub fn parse_names(body: &str, domain: &Domain) -> Result<Vec<String>, SourceError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|_| SourceError::Throttled("malformed payload".to_string()))?;

    if !value.is_array() {
        let detail = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unexpected payload shape");
        return Err(SourceError::Throttled(detail.to_string()));
    }

    let issuances: Vec<Issuance> =
        serde_json::from_value(value).map_err(|e| SourceError::Parse(e.to_string()))?;

    let names = issuances
        .into_iter()
        .flat_map(|issuance| issuance.dns_names)
        .filter(|name| name.to_lowercase().contains(domain.as_str()))
        .map(|name| name.replace("*.", ""))
        .collect();

    Ok(names)
}
