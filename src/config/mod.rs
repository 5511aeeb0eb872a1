pub mod toml_config;

use crate::adapters::dns::{ResolverTiming, DEFAULT_DOH_ENDPOINT, DEFAULT_NAMESERVERS};
use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::adapters::sources::{archive, bufferover, certspotter, crtsh, virustotal};
use crate::domain::model::SourceKind;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_list, validate_positive_number, validate_range, validate_url, Validate,
};
use std::net::IpAddr;
use std::time::Duration;

#[cfg(feature = "cli")]
use crate::core::report::ReportFormat;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub use toml_config::TomlConfig;

const MAX_TIMEOUT_SECS: u64 = 120;

/// Base URLs of every source, overridable for mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoints {
    pub archive: String,
    pub crtsh: String,
    pub certspotter: String,
    pub bufferover: String,
    pub virustotal: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            archive: archive::DEFAULT_ENDPOINT.to_string(),
            crtsh: crtsh::DEFAULT_ENDPOINT.to_string(),
            certspotter: certspotter::DEFAULT_ENDPOINT.to_string(),
            bufferover: bufferover::DEFAULT_ENDPOINT.to_string(),
            virustotal: virustotal::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl SourceEndpoints {
    pub fn for_kind(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Archive => &self.archive,
            SourceKind::Crtsh => &self.crtsh,
            SourceKind::Certspotter => &self.certspotter,
            SourceKind::Bufferover => &self.bufferover,
            SourceKind::Virustotal => &self.virustotal,
        }
    }
}

/// Runtime knobs for one enumeration pass: defaults, then the TOML file, then CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sources: Vec<SourceKind>,
    pub nameservers: Vec<IpAddr>,
    pub dns_timeout: Duration,
    pub dns_lifetime: Duration,
    pub doh_endpoint: String,
    pub fallback_timeout: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub concurrency: usize,
    pub endpoints: SourceEndpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: SourceKind::DEFAULT_ENABLED.to_vec(),
            nameservers: DEFAULT_NAMESERVERS.to_vec(),
            dns_timeout: Duration::from_secs(2),
            dns_lifetime: Duration::from_secs(2),
            doh_endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            fallback_timeout: Duration::from_secs(5),
            http_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 20,
            endpoints: SourceEndpoints::default(),
        }
    }
}

impl Settings {
    pub fn timing(&self) -> ResolverTiming {
        ResolverTiming {
            primary_budget: self.dns_lifetime,
            fallback_budget: self.fallback_timeout,
            slow_threshold: self.dns_lifetime,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_list("sources.enabled", &self.sources)?;
        validate_non_empty_list("dns.nameservers", &self.nameservers)?;
        validate_positive_number("resolve.concurrency", self.concurrency, 1)?;

        for (field, value) in [
            ("dns.timeout_secs", self.dns_timeout),
            ("dns.lifetime_secs", self.dns_lifetime),
            ("dns.fallback_timeout_secs", self.fallback_timeout),
            ("http.timeout_secs", self.http_timeout),
        ] {
            validate_range(field, value.as_secs(), 1, MAX_TIMEOUT_SECS)?;
        }

        validate_url("dns.doh_endpoint", &self.doh_endpoint)?;
        for kind in &self.sources {
            validate_url(&format!("endpoints.{}", kind), self.endpoints.for_kind(*kind))?;
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sub-enum", version)]
#[command(about = "Discover subdomains from public intelligence sources and resolve them")]
pub struct CliConfig {
    /// Target domain, e.g. example.com
    pub domain: String,

    /// Sources to query
    #[arg(long, value_enum, value_delimiter = ',')]
    pub sources: Option<Vec<SourceKind>>,

    /// Primary recursive nameservers
    #[arg(long, value_delimiter = ',')]
    pub nameservers: Option<Vec<IpAddr>>,

    /// Per-query DNS timeout in seconds
    #[arg(long)]
    pub dns_timeout: Option<u64>,

    /// Budget for the whole primary DNS attempt in seconds
    #[arg(long)]
    pub dns_lifetime: Option<u64>,

    /// JSON DNS-over-HTTPS API used as fallback
    #[arg(long)]
    pub doh_endpoint: Option<String>,

    /// Budget for the fallback lookup in seconds
    #[arg(long)]
    pub fallback_timeout: Option<u64>,

    /// Timeout for source requests in seconds
    #[arg(long)]
    pub http_timeout: Option<u64>,

    /// Maximum concurrent lookups
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Builds validated settings from defaults, the optional file and the flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(sources) = &self.sources {
            settings.sources = sources.clone();
        }
        if let Some(nameservers) = &self.nameservers {
            settings.nameservers = nameservers.clone();
        }
        if let Some(secs) = self.dns_timeout {
            settings.dns_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.dns_lifetime {
            settings.dns_lifetime = Duration::from_secs(secs);
        }
        if let Some(endpoint) = &self.doh_endpoint {
            settings.doh_endpoint = endpoint.clone();
        }
        if let Some(secs) = self.fallback_timeout {
            settings.fallback_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.http_timeout {
            settings.http_timeout = Duration::from_secs(secs);
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }

        settings.validate()?;
        Ok(settings)
    }
}
