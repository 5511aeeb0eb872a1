use crate::domain::model::{Discoveries, Domain, Resolution, SourceError, SourceKind};
use async_trait::async_trait;

/// One intelligence source. Failures come back as values; adapters never panic or abort the run.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, domain: &Domain) -> std::result::Result<Discoveries, SourceError>;
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Always returns, within the resolver's configured time budget.
    async fn resolve(&self, host: &str) -> Resolution;
}

/// User-facing progress lines emitted while a run proceeds.
pub trait ProgressReporter: Send + Sync {
    fn source_started(&self, kind: SourceKind);
    fn discovered(&self, name: &str);
    fn source_failed(&self, kind: SourceKind, error: &SourceError);
    fn lookups_started(&self, candidates: usize);
    fn slow_lookup(&self, host: &str);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn source_started(&self, _kind: SourceKind) {}
    fn discovered(&self, _name: &str) {}
    fn source_failed(&self, _kind: SourceKind, _error: &SourceError) {}
    fn lookups_started(&self, _candidates: usize) {}
    fn slow_lookup(&self, _host: &str) {}
}
