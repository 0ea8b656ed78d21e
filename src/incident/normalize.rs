//! Conversion of typed incidents into canonical `UserIncident` records.

use crate::incident::decode::{Identifier, TypedIncident};
use crate::incident::identity::IdentityResolver;
use crate::model::{IncidentCategory, IncidentSeverity, UserIncident};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The identity table has no entry for the record's source identifier.
    /// Fatal to that single record only; the run carries on.
    #[error("no identity entry for {category} identifier {identifier:?}")]
    UnresolvedIdentity {
        category: IncidentCategory,
        identifier: String,
    },
}

/// Normalize one typed incident, resolving its identifier to an employee key
/// per the category's policy. Dispatch is an exhaustive match over the
/// closed category set.
pub fn normalize(
    incident: TypedIncident,
    resolver: &IdentityResolver,
) -> Result<UserIncident, NormalizeError> {
    match incident {
        TypedIncident::Denial(d) => Ok(direct(
            IncidentCategory::Denial,
            d.priority,
            d.timestamp,
            d.reported_by.to_string(),
        )),
        TypedIncident::Intrusion(i) => resolved(
            IncidentCategory::Intrusion,
            i.priority,
            i.timestamp,
            &i.internal_ip,
            resolver,
        ),
        TypedIncident::Executable(e) => resolved(
            IncidentCategory::Executable,
            e.priority,
            e.timestamp,
            &e.machine_ip,
            resolver,
        ),
        TypedIncident::Misuse(m) => Ok(direct(
            IncidentCategory::Misuse,
            m.priority,
            m.timestamp,
            m.employee_id,
        )),
        TypedIncident::Unauthorized(u) => Ok(direct(
            IncidentCategory::Unauthorized,
            u.priority,
            u.timestamp,
            u.employee_id.to_string(),
        )),
        TypedIncident::Probing(p) => resolved(
            IncidentCategory::Probing,
            p.priority,
            p.timestamp,
            &p.ip,
            resolver,
        ),
        // The employee/external split was decided at decode time.
        TypedIncident::Other(o) => match o.identifier {
            Identifier::Employee(n) => Ok(direct(
                IncidentCategory::Other,
                o.priority,
                o.timestamp,
                n.to_string(),
            )),
            Identifier::External(s) => resolved(
                IncidentCategory::Other,
                o.priority,
                o.timestamp,
                &s,
                resolver,
            ),
        },
    }
}

fn direct(
    category: IncidentCategory,
    priority: IncidentSeverity,
    timestamp: DateTime<Utc>,
    employee_id: String,
) -> UserIncident {
    UserIncident {
        category,
        priority,
        timestamp,
        employee_id,
    }
}

fn resolved(
    category: IncidentCategory,
    priority: IncidentSeverity,
    timestamp: DateTime<Utc>,
    identifier: &str,
    resolver: &IdentityResolver,
) -> Result<UserIncident, NormalizeError> {
    let employee_id = resolver
        .resolve(identifier)
        .ok_or_else(|| NormalizeError::UnresolvedIdentity {
            category,
            identifier: identifier.to_string(),
        })?
        .to_string();
    Ok(UserIncident {
        category,
        priority,
        timestamp,
        employee_id,
    })
}
