//! BufferOver passive-DNS dataset.
//!
//! API: https://dns.bufferover.run/dns?q=.example.com
//! Forward records arrive already resolved as `"ip,name"` strings, so these
//! names skip DNS resolution later on.

use crate::adapters::http::fetch_text;
use crate::domain::model::{Discoveries, Discovery, Domain, SourceError, SourceKind};
use crate::domain::ports::SourceAdapter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::Ipv4Addr;

pub const DEFAULT_ENDPOINT: &str = "https://dns.bufferover.run/dns";

#[derive(Debug, Deserialize)]
struct ForwardDns {
    #[serde(rename = "FDNS_A", default)]
    fdns_a: Option<Vec<String>>,
}

pub struct BufferOverSource {
    client: Client,
    endpoint: String,
}

impl BufferOverSource {
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for BufferOverSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bufferover
    }

    async fn fetch(&self, domain: &Domain) -> Result<Discoveries, SourceError> {
        let query = format!(".{}", domain);
        let request = self.client.get(&self.endpoint).query(&[("q", query.as_str())]);

        let body = fetch_text(request).await?;
        let found = parse_records(&body)?;
        tracing::debug!("bufferover returned {} records for {}", found.len(), domain);

        Ok(Discoveries::from(found))
    }
}

pub fn parse_records(body: &str) -> Result<Vec<Discovery>, SourceError> {
    let payload: ForwardDns =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let records = payload
        .fdns_a
        .ok_or_else(|| SourceError::Throttled("no FDNS_A records in payload".to_string()))?;

    let found = records
        .iter()
        .filter_map(|record| {
            let (ip, name) = record.split_once(',')?;
            match ip.trim().parse::<Ipv4Addr>() {
                Ok(addr) => Some(Discovery::resolved(name.trim(), addr)),
                Err(_) => Some(Discovery::name(name.trim())),
            }
        })
        .collect();

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_keeps_addresses() {
        let body = r#"{"Meta":{},"FDNS_A":["93.184.216.34,www.example.com","bogus,api.example.com","no-comma"],"RDNS":null}"#;

        let found = parse_records(body).unwrap();
        assert_eq!(
            found,
            vec![
                Discovery::resolved("www.example.com", Ipv4Addr::new(93, 184, 216, 34)),
                Discovery::name("api.example.com"),
            ]
        );
    }

    #[test]
    fn test_parse_records_null_dataset_is_throttled() {
        let body = r#"{"Meta":{"Errors":["quota"]},"FDNS_A":null}"#;
        assert!(matches!(parse_records(body), Err(SourceError::Throttled(_))));
        assert!(matches!(parse_records("nope"), Err(SourceError::Parse(_))));
    }
}
