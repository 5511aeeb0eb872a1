use crate::domain::model::{Discovery, Domain};
use crate::utils::validation::is_domain_like;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_.+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)+$").expect("email pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Email,
    RootDomain,
    NotDomainLike,
}

/// What happened to one discovery on insert. `Added` carries the normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Added(String),
    Duplicate,
    Rejected(Rejection),
}

/// Normalizes a raw source string into a candidate hostname.
///
/// Lower-cases and trims, drops scheme, path, query and port, removes wildcard
/// markers and stray dots. Returns the rejection reason when the result is an
/// email address or not shaped like a hostname.
pub fn normalize(raw: &str) -> Result<String, Rejection> {
    let lowered = raw.trim().to_lowercase();

    if EMAIL_REGEX.is_match(&lowered) {
        return Err(Rejection::Email);
    }

    let without_scheme = lowered
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lowered);

    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    let host = match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    };

    let host = host
        .trim_start_matches(['*', '.'])
        .trim_end_matches('.')
        .trim();

    if host.contains('@') {
        return Err(Rejection::Email);
    }

    if !is_domain_like(host) {
        return Err(Rejection::NotDomainLike);
    }

    Ok(host.to_string())
}

/// Deduplicated candidate hostnames for one run, with addresses already known from passive DNS.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: BTreeMap<String, Option<Ipv4Addr>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, root: &Domain, discovery: Discovery) -> Admission {
        let name = match normalize(&discovery.name) {
            Ok(name) => name,
            Err(rejection) => return Admission::Rejected(rejection),
        };

        if name == root.as_str() {
            return Admission::Rejected(Rejection::RootDomain);
        }

        match self.entries.get_mut(&name) {
            Some(known) => {
                // 保留被動 DNS 已知的位址
                if known.is_none() {
                    *known = discovery.address;
                }
                Admission::Duplicate
            }
            None => {
                self.entries.insert(name.clone(), discovery.address);
                Admission::Added(name)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, Option<Ipv4Addr>)> {
        self.entries.into_iter()
    }
}
