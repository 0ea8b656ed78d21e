//! The top-level aggregation run: concurrent category fetches fanned in
//! through a single-owner aggregator.

use crate::incident::aggregate::EmployeeRiskAggregator;
use crate::incident::decode::decode;
use crate::incident::identity::{IdentityResolver, IdentityTable};
use crate::incident::normalize::{normalize, NormalizeError};
use crate::model::{AggregateResult, IncidentCategory};
use crate::source::{IncidentSource, SourceError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Only an identity-fetch failure fails a whole run; everything below the
/// identity fetch degrades a category or a single record instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("identity fetch failed: {0}")]
    IdentityFetch(#[source] SourceError),
}

/// One record that could not be attributed to an employee.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedIncident {
    pub category: IncidentCategory,
    pub reason: String,
}

/// A category whose fetch or decode failed; it contributes zero incidents to
/// an otherwise successful run.
#[derive(Debug, Clone, Serialize)]
pub struct DegradedCategory {
    pub category: IncidentCategory,
    pub error: String,
}

/// Result of one run: the aggregate plus enough diagnostics to distinguish
/// "succeeded with N degraded records" from "failed entirely".
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub aggregate: AggregateResult,
    pub skipped: Vec<SkippedIncident>,
    pub degraded: Vec<DegradedCategory>,
    /// Records observed across all successfully decoded categories,
    /// including ones later skipped for unresolved identity.
    pub total_incidents: usize,
}

pub struct AggregationPipeline {
    source: Arc<dyn IncidentSource>,
}

impl AggregationPipeline {
    pub fn new(source: Arc<dyn IncidentSource>) -> Self {
        Self { source }
    }

    /// One full aggregation run.
    ///
    /// Identity data is a precondition for normalization, so the bulk
    /// identity fetch completes before any category work starts. Categories
    /// then fetch concurrently (one task each) and are decoded, normalized,
    /// and folded in completion order; the fold is commutative, so the final
    /// aggregate does not depend on that order.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let identities = self
            .source
            .fetch_identities()
            .await
            .map_err(PipelineError::IdentityFetch)?;
        let resolver = IdentityResolver::new(IdentityTable::new(identities));
        info!(%run_id, identities = resolver.len(), "identity table ready");

        let mut fetches = JoinSet::new();
        for category in IncidentCategory::ALL {
            let source = Arc::clone(&self.source);
            fetches.spawn(async move { (category, source.fetch_category(category).await) });
        }

        let mut aggregator = EmployeeRiskAggregator::new();
        let mut skipped = Vec::new();
        let mut degraded = Vec::new();
        let mut total_incidents = 0usize;

        while let Some(joined) = fetches.join_next().await {
            let (category, fetched) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(%run_id, "category fetch task did not complete: {e}");
                    continue;
                }
            };

            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(%run_id, %category, error = %e, "category fetch failed; dropping it from this run");
                    degraded.push(DegradedCategory {
                        category,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let typed = match decode(category, &raw) {
                Ok(typed) => typed,
                Err(e) => {
                    warn!(%run_id, %category, error = %e, "category decode failed; dropping it from this run");
                    degraded.push(DegradedCategory {
                        category,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            total_incidents += typed.len();
            let mut unresolved = 0usize;
            for incident in typed {
                match normalize(incident, &resolver) {
                    Ok(user) => aggregator.fold(user),
                    Err(e @ NormalizeError::UnresolvedIdentity { .. }) => {
                        unresolved += 1;
                        skipped.push(SkippedIncident {
                            category,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            info!(%run_id, %category, records = raw.len(), unresolved, "category folded");
        }

        info!(
            %run_id,
            total_incidents,
            skipped = skipped.len(),
            degraded = degraded.len(),
            "aggregation run complete"
        );

        Ok(RunReport {
            run_id,
            aggregate: aggregator.into_result(),
            skipped,
            degraded,
            total_incidents,
        })
    }
}
