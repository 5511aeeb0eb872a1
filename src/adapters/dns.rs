//! Two-step hostname resolution.
//!
//! Step one asks a fixed set of public recursive nameservers. When that yields
//! no usable answer (no records, NXDOMAIN, timeout, unreachable servers) the
//! name is retried exactly once against a JSON DNS-over-HTTPS API. Both steps
//! run under their own deadline, so a resolve call is bounded by their sum.

use crate::domain::model::{Resolution, ResolutionResult};
use crate::domain::ports::HostResolver;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

pub const DEFAULT_NAMESERVERS: [IpAddr; 3] = [
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)),
];

pub const DEFAULT_DOH_ENDPOINT: &str = "https://dns.google.com/resolve";

const MAX_NAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupFailure {
    #[error("no answer")]
    NoAnswer,

    #[error("NXDOMAIN")]
    NxDomain,

    #[error("timed out")]
    Timeout,

    #[error("no nameservers could be reached")]
    NoNameservers,

    #[error("malformed hostname: {0}")]
    Malformed(String),

    #[error("{0}")]
    Transport(String),
}

impl LookupFailure {
    /// Failures after which the fallback step is worth trying.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            LookupFailure::NoAnswer
                | LookupFailure::NxDomain
                | LookupFailure::Timeout
                | LookupFailure::NoNameservers
        )
    }
}

/// A single way of turning a hostname into an IPv4 address.
#[async_trait]
pub trait LookupStep: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup_a(&self, host: &str) -> Result<Ipv4Addr, LookupFailure>;
}

/// Rejects names no resolver would accept: empty labels, labels over 63 bytes, names over 253.
pub fn check_hostname(host: &str) -> Result<(), LookupFailure> {
    let name = host.strip_suffix('.').unwrap_or(host);

    if name.len() > MAX_NAME_LENGTH {
        return Err(LookupFailure::Malformed("name too long".to_string()));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(LookupFailure::Malformed("empty label".to_string()));
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(LookupFailure::Malformed(format!("label too long: {}", label)));
        }
    }

    Ok(())
}

/// Plain DNS against an explicit nameserver list; the system configuration is ignored.
pub struct NameserverLookup {
    resolver: TokioAsyncResolver,
}

impl NameserverLookup {
    pub fn new(nameservers: &[IpAddr], timeout: Duration) -> Self {
        let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.use_hosts_file = false;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl LookupStep for NameserverLookup {
    fn name(&self) -> &str {
        "public nameservers"
    }

    async fn lookup_a(&self, host: &str) -> Result<Ipv4Addr, LookupFailure> {
        let lookup = self.resolver.ipv4_lookup(host).await.map_err(classify)?;
        lookup
            .iter()
            .next()
            .map(|record| record.0)
            .ok_or(LookupFailure::NoAnswer)
    }
}

fn classify(err: ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            LookupFailure::NxDomain
        }
        ResolveErrorKind::NoRecordsFound { .. } => LookupFailure::NoAnswer,
        ResolveErrorKind::Timeout => LookupFailure::Timeout,
        ResolveErrorKind::NoConnections => LookupFailure::NoNameservers,
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            LookupFailure::Timeout
        }
        other => LookupFailure::Transport(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(default)]
    data: String,
}

/// JSON DNS-over-HTTPS (`?name=host&type=A`), as served by dns.google.com.
pub struct DohLookup {
    client: Client,
    endpoint: String,
}

impl DohLookup {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LookupStep for DohLookup {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn lookup_a(&self, host: &str) -> Result<Ipv4Addr, LookupFailure> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", host), ("type", "A")])
            .header(ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(LookupFailure::Transport(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: DohResponse = response.json().await.map_err(transport_failure)?;
        first_ipv4(&body.answer).ok_or(LookupFailure::NoAnswer)
    }
}

fn transport_failure(err: reqwest::Error) -> LookupFailure {
    if err.is_timeout() {
        LookupFailure::Timeout
    } else {
        LookupFailure::Transport(err.to_string())
    }
}

// CNAME 會排在 A 記錄之前，取第一個點分十進位的答案
fn first_ipv4(answers: &[DohAnswer]) -> Option<Ipv4Addr> {
    answers
        .iter()
        .find_map(|answer| answer.data.trim().parse::<Ipv4Addr>().ok())
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverTiming {
    /// Whole budget for the nameserver step.
    pub primary_budget: Duration,
    /// Whole budget for the fallback step.
    pub fallback_budget: Duration,
    /// Primary attempts slower than this are reported as slow.
    pub slow_threshold: Duration,
}

impl Default for ResolverTiming {
    fn default() -> Self {
        Self {
            primary_budget: Duration::from_secs(2),
            fallback_budget: Duration::from_secs(5),
            slow_threshold: Duration::from_secs(2),
        }
    }
}

pub struct FallbackResolver<P: LookupStep, F: LookupStep> {
    primary: P,
    fallback: F,
    timing: ResolverTiming,
}

impl<P: LookupStep, F: LookupStep> FallbackResolver<P, F> {
    pub fn new(primary: P, fallback: F, timing: ResolverTiming) -> Self {
        Self {
            primary,
            fallback,
            timing,
        }
    }

    async fn bounded<S: LookupStep>(
        step: &S,
        host: &str,
        budget: Duration,
    ) -> Result<Ipv4Addr, LookupFailure> {
        match tokio::time::timeout(budget, step.lookup_a(host)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LookupFailure::Timeout),
        }
    }
}

#[async_trait]
impl<P: LookupStep, F: LookupStep> HostResolver for FallbackResolver<P, F> {
    async fn resolve(&self, host: &str) -> Resolution {
        if let Err(reason) = check_hostname(host) {
            tracing::debug!("skipping {}: {}", host, reason);
            return Resolution::direct(ResolutionResult::Unresolved);
        }

        let started = Instant::now();
        let failure =
            match Self::bounded(&self.primary, host, self.timing.primary_budget).await {
                Ok(addr) => return Resolution::direct(ResolutionResult::Resolved(addr)),
                Err(failure) => failure,
            };

        if !failure.allows_fallback() {
            tracing::debug!("{} unresolved via {}: {}", host, self.primary.name(), failure);
            return Resolution::direct(ResolutionResult::Unresolved);
        }

        let slow_primary = started.elapsed() > self.timing.slow_threshold;
        tracing::debug!(
            "{} via {} failed ({}) after {:?}, trying {}",
            host,
            self.primary.name(),
            failure,
            started.elapsed(),
            self.fallback.name()
        );

        let result = match Self::bounded(&self.fallback, host, self.timing.fallback_budget).await {
            Ok(addr) => ResolutionResult::Resolved(addr),
            Err(LookupFailure::Timeout) => ResolutionResult::TimedOut,
            Err(other) => {
                tracing::debug!("{} unresolved via {}: {}", host, self.fallback.name(), other);
                ResolutionResult::Unresolved
            }
        };

        Resolution {
            result,
            used_fallback: true,
            slow_primary,
        }
    }
}
