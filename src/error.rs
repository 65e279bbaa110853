//! Error types for the course-evals engine
//!
//! Every error classifies into one of three kinds:
//! - Validation: malformed/missing input, mismatched combinator lengths,
//!   or a question number absent from the weight configuration
//! - Computation: a combination formula produced a non-finite result
//! - Cardinality: a composite-key lookup found zero or several rows where
//!   exactly one was expected

use thiserror::Error;

/// Classification of an [`EvalError`], used by callers to decide whether a
/// failure indicates bad input, a numeric breakdown, or an internal
/// consistency violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input data
    Validation,
    /// A statistic combination produced a non-finite result
    Computation,
    /// A key lookup violated an exactly-one expectation
    Cardinality,
}

/// Errors that can occur during aggregation
#[derive(Error, Debug)]
pub enum EvalError {
    // Validation
    #[error("input sequences to {operation} must have equal lengths (got {lengths:?})")]
    LengthMismatch {
        operation: &'static str,
        lengths: Vec<usize>,
    },

    #[error("total population weight is zero in {operation}")]
    ZeroWeightSum { operation: &'static str },

    #[error("no weight configured for question {question} in college {college}")]
    UnknownQuestionWeight { college: String, question: u16 },

    #[error("invalid weight {weight} for question {question} in college {college}")]
    InvalidWeight {
        college: String,
        question: u16,
        weight: f64,
    },

    #[error("college {college} has an empty question-weight table")]
    EmptyCollegeWeights { college: String },

    #[error("invalid term code: {0} (expected YYYYSS with SS in {{10, 20, 30}})")]
    InvalidTermCode(u32),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Computation
    #[error("combined {statistic} is not finite")]
    NonFinite { statistic: &'static str },

    #[error("aggregation failed for {tier} group {key}: {source}")]
    GroupComputation {
        tier: &'static str,
        key: String,
        #[source]
        source: Box<EvalError>,
    },

    // Cardinality
    #[error("expected exactly one row for key {key}, found {found}")]
    CardinalityViolation { key: String, found: usize },
}

impl EvalError {
    /// Classify this error per the engine's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::LengthMismatch { .. }
            | EvalError::ZeroWeightSum { .. }
            | EvalError::UnknownQuestionWeight { .. }
            | EvalError::InvalidWeight { .. }
            | EvalError::EmptyCollegeWeights { .. }
            | EvalError::InvalidTermCode(_)
            | EvalError::InvalidValue { .. }
            | EvalError::Toml(_)
            | EvalError::Json(_) => ErrorKind::Validation,
            EvalError::NonFinite { .. } => ErrorKind::Computation,
            // A group failure classifies as whatever broke inside the group
            EvalError::GroupComputation { source, .. } => source.kind(),
            EvalError::CardinalityViolation { .. } => ErrorKind::Cardinality,
        }
    }

    /// Create an error for an invalid value with context
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        EvalError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type alias using [`EvalError`]
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let e = EvalError::UnknownQuestionWeight {
            college: "GCoE".to_string(),
            question: 12,
        };
        assert_eq!(e.kind(), ErrorKind::Validation);

        let e = EvalError::NonFinite {
            statistic: "standard deviation",
        };
        assert_eq!(e.kind(), ErrorKind::Computation);

        let e = EvalError::GroupComputation {
            tier: "course",
            key: "201710/ENGR/2303".to_string(),
            source: Box::new(EvalError::NonFinite {
                statistic: "standard deviation",
            }),
        };
        assert_eq!(e.kind(), ErrorKind::Computation);

        let e = EvalError::CardinalityViolation {
            key: "201710/ENGR/2303".to_string(),
            found: 2,
        };
        assert_eq!(e.kind(), ErrorKind::Cardinality);
    }

    #[test]
    fn test_error_display() {
        let e = EvalError::UnknownQuestionWeight {
            college: "GCoE".to_string(),
            question: 12,
        };
        assert_eq!(
            e.to_string(),
            "no weight configured for question 12 in college GCoE"
        );
    }
}
