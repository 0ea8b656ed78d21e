//! Domain model -- categories, severities, and the per-employee aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of incident categories the source exposes.
/// Drives both the decode target shape and the remote fetch path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    Denial,
    Intrusion,
    Executable,
    Misuse,
    Unauthorized,
    Probing,
    Other,
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 7] = [
        IncidentCategory::Denial,
        IncidentCategory::Intrusion,
        IncidentCategory::Executable,
        IncidentCategory::Misuse,
        IncidentCategory::Unauthorized,
        IncidentCategory::Probing,
        IncidentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Denial => "denial",
            IncidentCategory::Intrusion => "intrusion",
            IncidentCategory::Executable => "executable",
            IncidentCategory::Misuse => "misuse",
            IncidentCategory::Unauthorized => "unauthorized",
            IncidentCategory::Probing => "probing",
            IncidentCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity levels, ordered by risk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Canonical incident record. Category-specific structure is erased; this is
/// the only shape the aggregator consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIncident {
    #[serde(rename = "type")]
    pub category: IncidentCategory,
    pub priority: IncidentSeverity,
    pub timestamp: DateTime<Utc>,
    pub employee_id: String,
}

/// All incidents of one severity attributed to one employee.
/// Invariant: `count == incidents.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncidentSeverityAggregate {
    pub count: usize,
    pub incidents: Vec<UserIncident>,
}

impl IncidentSeverityAggregate {
    fn push(&mut self, incident: UserIncident) {
        self.incidents.push(incident);
        self.count += 1;
    }
}

/// One employee's incidents bucketed by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeRisk {
    pub low: IncidentSeverityAggregate,
    pub medium: IncidentSeverityAggregate,
    pub high: IncidentSeverityAggregate,
    pub critical: IncidentSeverityAggregate,
}

impl EmployeeRisk {
    pub fn record(&mut self, incident: UserIncident) {
        self.level_mut(incident.priority).push(incident);
    }

    pub fn level(&self, severity: IncidentSeverity) -> &IncidentSeverityAggregate {
        match severity {
            IncidentSeverity::Low => &self.low,
            IncidentSeverity::Medium => &self.medium,
            IncidentSeverity::High => &self.high,
            IncidentSeverity::Critical => &self.critical,
        }
    }

    fn level_mut(&mut self, severity: IncidentSeverity) -> &mut IncidentSeverityAggregate {
        match severity {
            IncidentSeverity::Low => &mut self.low,
            IncidentSeverity::Medium => &mut self.medium,
            IncidentSeverity::High => &mut self.high,
            IncidentSeverity::Critical => &mut self.critical,
        }
    }

    pub fn total_count(&self) -> usize {
        self.low.count + self.medium.count + self.high.count + self.critical.count
    }

    /// Sort every severity bucket so the aggregate is independent of the
    /// order incidents arrived in.
    pub(crate) fn sort_incidents(&mut self) {
        for bucket in [
            &mut self.low,
            &mut self.medium,
            &mut self.high,
            &mut self.critical,
        ] {
            bucket.incidents.sort_by(|a, b| {
                (a.timestamp, a.category, a.employee_id.as_str())
                    .cmp(&(b.timestamp, b.category, b.employee_id.as_str()))
            });
        }
    }
}

/// Final mapping of employee key to risk aggregate, built fresh each run.
pub type AggregateResult = BTreeMap<String, EmployeeRisk>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn incident(severity: IncidentSeverity) -> UserIncident {
        UserIncident {
            category: IncidentCategory::Misuse,
            priority: severity,
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            employee_id: "emp-1".to_string(),
        }
    }

    #[test]
    fn record_updates_matching_severity_bucket() {
        let mut risk = EmployeeRisk::default();
        risk.record(incident(IncidentSeverity::High));
        risk.record(incident(IncidentSeverity::High));
        risk.record(incident(IncidentSeverity::Low));

        assert_eq!(risk.high.count, 2);
        assert_eq!(risk.high.incidents.len(), 2);
        assert_eq!(risk.low.count, 1);
        assert_eq!(risk.medium.count, 0);
        assert_eq!(risk.total_count(), 3);
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&IncidentCategory::Unauthorized).unwrap();
        assert_eq!(json, "\"unauthorized\"");
        let parsed: IncidentSeverity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, IncidentSeverity::Critical);
    }
}
