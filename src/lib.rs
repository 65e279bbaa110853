//! Course Evals Engine
//!
//! Hierarchical weighted-statistics aggregation for student course
//! evaluations: raw question-level rows roll up into instructor-in-section,
//! course, and department tiers with population- and weight-adjusted
//! combined statistics, dense cohort ranks, and deterministic hash-derived
//! identifiers. The engine is a pure in-memory transform; ingestion and
//! persistence are the caller's job.

pub mod aggregate;
pub mod error;
pub mod keys;
pub mod logging;
pub mod normalize;
pub mod rank;
pub mod record;
pub mod report;
pub mod stats;
pub mod term;
pub mod weights;

pub use aggregate::{AggregationRun, Engine, EngineOptions};
pub use error::{ErrorKind, EvalError, Result};
pub use record::{AggregatedRecord, RawRecord};
pub use report::RunReport;
pub use weights::WeightTable;
