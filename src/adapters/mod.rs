// Adapters layer: concrete implementations of the domain ports (sources, DNS, terminal output).

pub mod dns;
pub mod http;
pub mod sources;
pub mod terminal;

use crate::config::Settings;
use crate::domain::ports::SourceAdapter;
use crate::utils::error::Result;
use dns::{DohLookup, FallbackResolver, NameserverLookup};

pub type DefaultResolver = FallbackResolver<NameserverLookup, DohLookup>;

/// One adapter per enabled source, sharing a single HTTP client.
pub fn build_sources(settings: &Settings) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let client = http::build_client(&settings.user_agent, settings.http_timeout)?;
    let mut kinds = settings.sources.clone();
    kinds.sort();
    kinds.dedup();

    Ok(kinds
        .into_iter()
        .map(|kind| sources::build_source(kind, client.clone(), &settings.endpoints))
        .collect())
}

/// Nameserver lookup first, DNS-over-HTTPS second.
pub fn build_resolver(settings: &Settings) -> Result<DefaultResolver> {
    let primary = NameserverLookup::new(&settings.nameservers, settings.dns_timeout);
    let doh_client = http::build_client(&settings.user_agent, settings.fallback_timeout)?;
    let fallback = DohLookup::new(doh_client, settings.doh_endpoint.clone());

    Ok(FallbackResolver::new(primary, fallback, settings.timing()))
}
