use crate::core::candidate::{Admission, CandidateSet};
use crate::domain::model::{Discoveries, Domain, Report, ReportRow, ResolutionResult};
use crate::domain::ports::{HostResolver, ProgressReporter, SourceAdapter};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Fans out to every source, merges their names, then resolves each candidate.
pub struct Aggregator<R: HostResolver> {
    sources: Vec<Box<dyn SourceAdapter>>,
    resolver: R,
    concurrency: usize,
    progress: Arc<dyn ProgressReporter>,
}

impl<R: HostResolver> Aggregator<R> {
    pub fn new(
        mut sources: Vec<Box<dyn SourceAdapter>>,
        resolver: R,
        concurrency: usize,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        // archive 先跑，使用者較早看到結果
        sources.sort_by_key(|source| source.kind());
        Self {
            sources,
            resolver,
            concurrency: concurrency.max(1),
            progress,
        }
    }

    /// Queries all sources concurrently and merges each one as soon as it and every earlier source are done.
    pub async fn collect_candidates(&self, domain: &Domain) -> CandidateSet {
        let fetches = self.sources.iter().map(|source| async move {
            let started = Instant::now();
            let outcome = source.fetch(domain).await;
            tracing::debug!(
                "{} finished in {:?}",
                source.kind(),
                started.elapsed()
            );
            (source.kind(), outcome)
        });
        // 依來源順序輸出，archive 完成即可先顯示
        let mut outcomes =
            std::pin::pin!(stream::iter(fetches).buffered(self.sources.len().max(1)));

        // 單一寫入者合併，不需鎖
        let mut candidates = CandidateSet::new();
        while let Some((kind, outcome)) = outcomes.next().await {
            self.progress.source_started(kind);

            let discoveries: Discoveries = match outcome {
                Ok(discoveries) => discoveries,
                Err(error) => {
                    tracing::debug!("Source {} failed for {}: {}", kind, domain, error);
                    self.progress.source_failed(kind, &error);
                    continue;
                }
            };

            let yielded = discoveries.len();
            let mut added = 0usize;
            for discovery in discoveries {
                let raw = discovery.name.clone();
                match candidates.insert(domain, discovery) {
                    Admission::Added(name) => {
                        added += 1;
                        self.progress.discovered(&name);
                    }
                    Admission::Duplicate => {}
                    Admission::Rejected(reason) => {
                        tracing::debug!("Dropped '{}' from {}: {:?}", raw, kind, reason);
                    }
                }
            }
            tracing::info!(
                "{} yielded {} names, {} new candidates",
                kind,
                yielded,
                added
            );
        }

        candidates
    }

    /// Runs the whole pipeline for one domain. Never fails; sources and lookups degrade to empty or placeholder values.
    pub async fn aggregate(&self, domain: &Domain) -> Report {
        let candidates = self.collect_candidates(domain).await;
        if candidates.is_empty() {
            tracing::info!("No candidates discovered for {}", domain);
            return Report::new(domain.clone(), Vec::new());
        }

        self.progress.lookups_started(candidates.len());

        let rows: Vec<ReportRow> = stream::iter(candidates.into_entries())
            .map(|(host, known)| async move {
                let result = match known {
                    Some(address) => ResolutionResult::Resolved(address),
                    None => {
                        let resolution = self.resolver.resolve(&host).await;
                        if resolution.used_fallback {
                            tracing::debug!(
                                "{} needed the fallback resolver: {}",
                                host,
                                resolution.result.display()
                            );
                        }
                        if resolution.slow_primary {
                            self.progress.slow_lookup(&host);
                        }
                        resolution.result
                    }
                };
                ReportRow::new(domain, &host, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        Report::new(domain.clone(), rows)
    }
}
