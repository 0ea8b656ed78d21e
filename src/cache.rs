//! Process-wide cache of the most recent aggregate.
//!
//! Empty at start, populated by the refresh loop (or a cold-start read), and
//! replaced atomically -- never a partial in-place update. A failed run does
//! not touch it, so the read path always serves the last good aggregate.

use crate::incident::pipeline::{DegradedCategory, RunReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Summary of the last completed run, served by the status endpoint so the
/// diagnostic channel is observable rather than log-only.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub refreshed_at: DateTime<Utc>,
    pub total_incidents: usize,
    pub skipped_incidents: usize,
    pub degraded_categories: Vec<DegradedCategory>,
}

#[derive(Debug, Clone)]
struct CachedRun {
    body: Arc<str>,
    summary: RunSummary,
}

#[derive(Debug, Default)]
pub struct AggregateCache {
    inner: RwLock<Option<CachedRun>>,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the aggregate once and swap it in. Caching the serialized
    /// body keeps per-request work off the read path.
    pub async fn store(&self, report: &RunReport) -> serde_json::Result<RunSummary> {
        let body: Arc<str> = serde_json::to_string(&report.aggregate)?.into();
        let summary = RunSummary {
            run_id: report.run_id,
            refreshed_at: Utc::now(),
            total_incidents: report.total_incidents,
            skipped_incidents: report.skipped.len(),
            degraded_categories: report.degraded.clone(),
        };
        *self.inner.write().await = Some(CachedRun {
            body,
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// The serialized aggregate from the last successful run, if any.
    pub async fn body(&self) -> Option<Arc<str>> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|cached| Arc::clone(&cached.body))
    }

    pub async fn summary(&self) -> Option<RunSummary> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|cached| cached.summary.clone())
    }
}
