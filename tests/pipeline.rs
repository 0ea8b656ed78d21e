//! End-to-end pipeline tests against an in-process incident source.

use riskwatch::cache::AggregateCache;
use riskwatch::incident::{AggregationPipeline, PipelineError};
use riskwatch::model::{IncidentCategory, IncidentSeverity};
use riskwatch::source::{IncidentSource, SourceError};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct MockSource {
    identities: HashMap<String, String>,
    fail_identities: bool,
    records: HashMap<IncidentCategory, Vec<Value>>,
    fail_categories: HashSet<IncidentCategory>,
}

impl MockSource {
    fn with_identities(entries: &[(&str, &str)]) -> Self {
        Self {
            identities: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn records(mut self, category: IncidentCategory, records: Vec<Value>) -> Self {
        self.records.insert(category, records);
        self
    }

    fn failing(mut self, category: IncidentCategory) -> Self {
        self.fail_categories.insert(category);
        self
    }
}

#[async_trait::async_trait]
impl IncidentSource for MockSource {
    async fn fetch_identities(&self) -> Result<HashMap<String, String>, SourceError> {
        if self.fail_identities {
            return Err(SourceError::Timeout);
        }
        Ok(self.identities.clone())
    }

    async fn fetch_category(
        &self,
        category: IncidentCategory,
    ) -> Result<Vec<Value>, SourceError> {
        if self.fail_categories.contains(&category) {
            return Err(SourceError::Transport("connection refused".to_string()));
        }
        Ok(self.records.get(&category).cloned().unwrap_or_default())
    }
}

fn pipeline(source: MockSource) -> AggregationPipeline {
    AggregationPipeline::new(Arc::new(source))
}

fn sample_source() -> MockSource {
    MockSource::with_identities(&[("10.0.0.5", "emp-1"), ("web-03", "emp-7")])
        .records(
            IncidentCategory::Probing,
            vec![json!({"ip": "10.0.0.5", "priority": "high", "timestamp": 1_700_000_000})],
        )
        .records(
            IncidentCategory::Denial,
            vec![json!({"reported_by": 831, "source_ip": "203.0.113.7", "priority": "low", "timestamp": 1_700_000_100})],
        )
        .records(
            IncidentCategory::Other,
            vec![
                json!({"identifier": "42", "priority": "medium", "timestamp": 1_700_000_200}),
                json!({"identifier": "web-03", "priority": "critical", "timestamp": 1_700_000_300}),
            ],
        )
}

#[tokio::test]
async fn aggregates_across_categories() {
    let report = pipeline(sample_source()).run().await.unwrap();

    assert!(report.degraded.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(report.total_incidents, 4);
    assert_eq!(report.aggregate.len(), 4); // emp-1, 831, 42, emp-7

    let emp1 = &report.aggregate["emp-1"];
    assert_eq!(emp1.high.count, 1);
    assert_eq!(emp1.high.incidents[0].category, IncidentCategory::Probing);
    assert_eq!(emp1.high.incidents[0].priority, IncidentSeverity::High);

    assert_eq!(report.aggregate["831"].low.count, 1);
    assert_eq!(report.aggregate["42"].medium.count, 1);
    assert_eq!(report.aggregate["emp-7"].critical.count, 1);

    for risk in report.aggregate.values() {
        for bucket in [&risk.low, &risk.medium, &risk.high, &risk.critical] {
            assert_eq!(bucket.count, bucket.incidents.len());
        }
    }
}

#[tokio::test]
async fn degraded_category_does_not_block_siblings() {
    let source = sample_source().failing(IncidentCategory::Denial);
    let report = pipeline(source).run().await.unwrap();

    assert_eq!(report.degraded.len(), 1);
    assert_eq!(report.degraded[0].category, IncidentCategory::Denial);
    assert!(report.degraded[0].error.contains("connection refused"));

    // The other categories still contribute.
    assert!(!report.aggregate.contains_key("831"));
    assert!(report.aggregate.contains_key("emp-1"));
    assert!(report.aggregate.contains_key("emp-7"));
}

#[tokio::test]
async fn malformed_category_is_degraded_with_context() {
    let source = sample_source().records(
        IncidentCategory::Misuse,
        vec![json!({"employee_id": "emp-2", "priority": "high"})], // no timestamp
    );
    let report = pipeline(source).run().await.unwrap();

    assert_eq!(report.degraded.len(), 1);
    assert_eq!(report.degraded[0].category, IncidentCategory::Misuse);
    assert!(report.degraded[0].error.contains("misuse"));
    assert!(report.aggregate.contains_key("emp-1"));
}

#[tokio::test]
async fn identity_fetch_failure_fails_the_run() {
    let source = MockSource {
        fail_identities: true,
        ..sample_source()
    };
    let err = pipeline(source).run().await.unwrap_err();
    assert!(matches!(err, PipelineError::IdentityFetch(_)));
}

#[tokio::test]
async fn unresolved_identity_is_skipped_not_fatal() {
    let source = MockSource::with_identities(&[]).records(
        IncidentCategory::Probing,
        vec![json!({"ip": "10.0.0.9", "priority": "low", "timestamp": 1_700_000_000})],
    );
    let report = pipeline(source).run().await.unwrap();

    assert!(report.aggregate.is_empty());
    assert_eq!(report.total_incidents, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].category, IncidentCategory::Probing);
    assert!(report.skipped[0].reason.contains("10.0.0.9"));
}

#[tokio::test]
async fn aggregate_is_deterministic_across_runs() {
    let first = pipeline(sample_source()).run().await.unwrap();
    let second = pipeline(sample_source()).run().await.unwrap();

    // Category completion order may differ between runs; the serialized
    // aggregate must not.
    assert_eq!(
        serde_json::to_string(&first.aggregate).unwrap(),
        serde_json::to_string(&second.aggregate).unwrap()
    );
}

#[tokio::test]
async fn failed_refresh_leaves_cached_aggregate_untouched() {
    let cache = AggregateCache::new();

    let report = pipeline(sample_source()).run().await.unwrap();
    let good = cache.store(&report).await.unwrap();

    let failing = MockSource {
        fail_identities: true,
        ..sample_source()
    };
    assert!(pipeline(failing).run().await.is_err());

    // Nothing was stored, so the previous run is still served.
    assert_eq!(cache.summary().await.unwrap().run_id, good.run_id);
    assert!(cache.body().await.is_some());
}
