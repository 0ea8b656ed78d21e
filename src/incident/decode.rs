//! Strict decoding of one category's raw records into typed incidents.

use crate::model::{IncidentCategory, IncidentSeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// A raw record did not match its category's expected shape. Decode is
/// all-or-nothing per category: one malformed record fails the whole call.
#[derive(Debug, Error)]
#[error("malformed {category} record at index {index}: {source}")]
pub struct DecodeError {
    pub category: IncidentCategory,
    pub index: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Timestamps arrive as integral epoch seconds; the conversion is lossless
/// to the second. Anything else is a shape error.
fn de_epoch_seconds<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| serde::de::Error::custom(format!("epoch seconds out of range: {secs}")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Denial {
    /// Already an employee key.
    pub reported_by: i64,
    pub source_ip: String,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intrusion {
    /// Resolves via the identity table.
    pub internal_ip: String,
    pub source_ip: String,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Executable {
    pub machine_ip: String,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Misuse {
    pub employee_id: String,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Unauthorized {
    pub employee_id: i64,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Probing {
    pub ip: String,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

/// The `other` category's ambiguous string-or-integer identifier, decided
/// once at decode time: an integer value (or a string that parses losslessly
/// as one) is already an employee key; anything else must resolve via the
/// identity table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Employee(i64),
    External(String),
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Identifier::Employee(n),
            Raw::Text(s) => match s.parse::<i64>() {
                Ok(n) => Identifier::Employee(n),
                Err(_) => Identifier::External(s),
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Other {
    pub identifier: Identifier,
    pub priority: IncidentSeverity,
    #[serde(deserialize_with = "de_epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

/// Tagged variant over the seven category shapes.
#[derive(Debug, Clone)]
pub enum TypedIncident {
    Denial(Denial),
    Intrusion(Intrusion),
    Executable(Executable),
    Misuse(Misuse),
    Unauthorized(Unauthorized),
    Probing(Probing),
    Other(Other),
}

impl TypedIncident {
    pub fn category(&self) -> IncidentCategory {
        match self {
            TypedIncident::Denial(_) => IncidentCategory::Denial,
            TypedIncident::Intrusion(_) => IncidentCategory::Intrusion,
            TypedIncident::Executable(_) => IncidentCategory::Executable,
            TypedIncident::Misuse(_) => IncidentCategory::Misuse,
            TypedIncident::Unauthorized(_) => IncidentCategory::Unauthorized,
            TypedIncident::Probing(_) => IncidentCategory::Probing,
            TypedIncident::Other(_) => IncidentCategory::Other,
        }
    }
}

/// Decode one category's raw record list. The category selects which of the
/// seven shapes to parse against; the source for one category is assumed
/// internally consistent, so there is no partial decode.
pub fn decode(
    category: IncidentCategory,
    records: &[Value],
) -> Result<Vec<TypedIncident>, DecodeError> {
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let wrap = |source| DecodeError {
                category,
                index,
                source,
            };
            let incident = match category {
                IncidentCategory::Denial => {
                    TypedIncident::Denial(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
                IncidentCategory::Intrusion => {
                    TypedIncident::Intrusion(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
                IncidentCategory::Executable => {
                    TypedIncident::Executable(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
                IncidentCategory::Misuse => {
                    TypedIncident::Misuse(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
                IncidentCategory::Unauthorized => {
                    TypedIncident::Unauthorized(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
                IncidentCategory::Probing => {
                    TypedIncident::Probing(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
                IncidentCategory::Other => {
                    TypedIncident::Other(serde_json::from_value(raw.clone()).map_err(wrap)?)
                }
            };
            Ok(incident)
        })
        .collect()
}
