//! Incident normalization and aggregation pipeline.
//!
//! Raw records of seven distinct shapes are decoded into a tagged variant,
//! resolved against the identity table, and folded into the per-employee
//! risk aggregate. Record-level failures are contained at the record,
//! category-level failures at the category; only an identity-fetch failure
//! fails a whole run.

pub mod aggregate;
pub mod decode;
pub mod identity;
pub mod normalize;
pub mod pipeline;

pub use aggregate::EmployeeRiskAggregator;
pub use decode::{decode, DecodeError, Identifier, TypedIncident};
pub use identity::{IdentityResolver, IdentityTable};
pub use normalize::{normalize, NormalizeError};
pub use pipeline::{
    AggregationPipeline, DegradedCategory, PipelineError, RunReport, SkippedIncident,
};
