use crate::utils::error::Result;
use crate::utils::validation::validate_domain;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Root target of a run. Always lower-case and syntactically valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn parse(input: &str) -> Result<Self> {
        validate_domain(input).map(Domain)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strips the `.{domain}` suffix from a name; names outside the domain are returned whole.
    pub fn display_label(&self, name: &str) -> String {
        let name = name.to_lowercase();
        match name.strip_suffix(self.0.as_str()) {
            Some(prefix) if prefix.ends_with('.') && prefix.len() > 1 => {
                prefix.trim_end_matches('.').to_string()
            }
            _ => name,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Web archive CDX index
    Archive,
    /// crt.sh certificate-transparency search
    Crtsh,
    /// Cert Spotter issuance log
    Certspotter,
    /// BufferOver passive-DNS dataset
    Bufferover,
    /// VirusTotal subdomain listing
    Virustotal,
}

impl SourceKind {
    pub const DEFAULT_ENABLED: [SourceKind; 3] =
        [SourceKind::Archive, SourceKind::Crtsh, SourceKind::Certspotter];

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Archive => "Web Archive -- archive.org",
            SourceKind::Crtsh => "Certificate Transparency -- crt.sh",
            SourceKind::Certspotter => "Issuance Log -- certspotter.com",
            SourceKind::Bufferover => "Passive DNS -- bufferover.run",
            SourceKind::Virustotal => "Passive DNS -- virustotal.com",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Archive => "archive",
            SourceKind::Crtsh => "crtsh",
            SourceKind::Certspotter => "certspotter",
            SourceKind::Bufferover => "bufferover",
            SourceKind::Virustotal => "virustotal",
        };
        f.write_str(name)
    }
}

/// One raw name produced by a source, optionally with an address the source already knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub name: String,
    pub address: Option<Ipv4Addr>,
}

impl Discovery {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    pub fn resolved(name: impl Into<String>, address: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            address: Some(address),
        }
    }
}

/// Finite, single-pass sequence of discoveries from one adapter.
#[derive(Debug)]
pub struct Discoveries {
    items: std::vec::IntoIter<Discovery>,
}

impl Discoveries {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Discovery::name).collect()
    }
}

impl From<Vec<Discovery>> for Discoveries {
    fn from(items: Vec<Discovery>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl FromIterator<Discovery> for Discoveries {
    fn from_iter<T: IntoIterator<Item = Discovery>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Iterator for Discoveries {
    type Item = Discovery;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Discoveries {}

/// Why a source produced nothing. Consumed by the aggregator, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("source might be throttling us: {0}")]
    Throttled(String),

    #[error("unexpected response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved(Ipv4Addr),
    Unresolved,
    TimedOut,
}

impl ResolutionResult {
    pub const PLACEHOLDER: &'static str = "None";

    pub fn address(&self) -> Option<Ipv4Addr> {
        match self {
            ResolutionResult::Resolved(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ResolutionResult::Resolved(_) => "resolved",
            ResolutionResult::Unresolved => "unresolved",
            ResolutionResult::TimedOut => "timed_out",
        }
    }

    /// Address string, or the shared placeholder for both failure outcomes.
    pub fn display(&self) -> String {
        match self {
            ResolutionResult::Resolved(addr) => addr.to_string(),
            ResolutionResult::Unresolved | ResolutionResult::TimedOut => {
                Self::PLACEHOLDER.to_string()
            }
        }
    }
}

/// Outcome of one resolve call plus what happened on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub result: ResolutionResult,
    pub used_fallback: bool,
    pub slow_primary: bool,
}

impl Resolution {
    pub fn direct(result: ResolutionResult) -> Self {
        Self {
            result,
            used_fallback: false,
            slow_primary: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub subdomain: String,
    pub host: String,
    pub domain: String,
    pub resolution: ResolutionResult,
}

impl ReportRow {
    pub fn new(domain: &Domain, host: &str, resolution: ResolutionResult) -> Self {
        Self {
            subdomain: domain.display_label(host),
            host: host.to_string(),
            domain: domain.to_string(),
            resolution,
        }
    }

    pub fn resolution_display(&self) -> String {
        self.resolution.display()
    }
}

/// Final result of a run, rows sorted by displayed subdomain.
#[derive(Debug, Clone)]
pub struct Report {
    pub domain: Domain,
    pub rows: Vec<ReportRow>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl Report {
    pub fn new(domain: Domain, mut rows: Vec<ReportRow>) -> Self {
        rows.sort_by(|a, b| a.subdomain.cmp(&b.subdomain).then_with(|| a.host.cmp(&b.host)));
        Self {
            domain,
            rows,
            generated_at: chrono::Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_strips_root_suffix() {
        let domain = Domain::parse("example.com").unwrap();
        assert_eq!(domain.display_label("www.example.com"), "www");
        assert_eq!(domain.display_label("API.Dev.Example.com"), "api.dev");
        assert_eq!(domain.display_label("notexample.com"), "notexample.com");
        assert_eq!(domain.display_label("cdn.other.net"), "cdn.other.net");
    }

    #[test]
    fn test_discoveries_is_single_pass() {
        let mut found = Discoveries::from_names(["a.example.com", "b.example.com"]);
        assert_eq!(found.len(), 2);
        assert_eq!(found.next().unwrap().name, "a.example.com");
        assert_eq!(found.by_ref().count(), 1);
        assert!(found.next().is_none());
    }

    #[test]
    fn test_resolution_display() {
        let addr = Ipv4Addr::new(93, 184, 216, 34);
        assert_eq!(ResolutionResult::Resolved(addr).display(), "93.184.216.34");
        assert_eq!(ResolutionResult::Unresolved.display(), "None");
        assert_eq!(ResolutionResult::TimedOut.display(), "None");
        assert_eq!(ResolutionResult::TimedOut.status(), "timed_out");
    }

    #[test]
    fn test_report_rows_sorted_by_subdomain() {
        let domain = Domain::parse("example.com").unwrap();
        let rows = vec![
            ReportRow::new(&domain, "www.example.com", ResolutionResult::Unresolved),
            ReportRow::new(&domain, "api.example.com", ResolutionResult::Unresolved),
            ReportRow::new(&domain, "mail.example.com", ResolutionResult::TimedOut),
        ];

        let report = Report::new(domain, rows);
        let order: Vec<_> = report.rows.iter().map(|r| r.subdomain.as_str()).collect();
        assert_eq!(order, vec!["api", "mail", "www"]);
    }
}
