//! Folding normalized incidents into the per-employee aggregate.

use crate::model::{AggregateResult, EmployeeRisk, UserIncident};
use std::collections::BTreeMap;

/// Folds a stream of canonical incidents into the per-employee, per-severity
/// aggregate. Owned by exactly one task: concurrent category fetches hand
/// their incidents to the fan-in side rather than sharing the map.
#[derive(Debug, Default)]
pub struct EmployeeRiskAggregator {
    entries: BTreeMap<String, EmployeeRisk>,
}

impl EmployeeRiskAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one incident: lazily create the all-zero entry for its employee,
    /// then append it to the bucket matching its severity.
    pub fn fold(&mut self, incident: UserIncident) {
        self.entries
            .entry(incident.employee_id.clone())
            .or_default()
            .record(incident);
    }

    /// Finalize the aggregate. Buckets are sorted so the result is identical
    /// regardless of the arrival order of categories or incidents.
    pub fn into_result(mut self) -> AggregateResult {
        for risk in self.entries.values_mut() {
            risk.sort_incidents();
        }
        self.entries
    }
}
