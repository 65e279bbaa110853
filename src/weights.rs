//! Question-weight configuration
//!
//! Maps college code → question number → importance weight. The table is
//! validated once at construction so a bad weight fails fast instead of
//! surfacing as an unrelated numeric error deep inside a combinator. A
//! (college, question) pair absent from the table is a validation error at
//! resolve time; weights are never silently defaulted to 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Validated question-weight lookup table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    table: BTreeMap<String, BTreeMap<u16, f64>>,
}

/// Wire shape of the table: question numbers are map keys, so they arrive as
/// strings in TOML/JSON and are parsed during validation.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RawWeightTable(BTreeMap<String, BTreeMap<String, f64>>);

impl WeightTable {
    /// Build a validated table from a nested mapping.
    ///
    /// Rejects empty per-college tables and weights that are non-finite or
    /// not strictly positive.
    pub fn from_map(raw: BTreeMap<String, BTreeMap<u16, f64>>) -> Result<Self> {
        for (college, questions) in &raw {
            if questions.is_empty() {
                return Err(EvalError::EmptyCollegeWeights {
                    college: college.clone(),
                });
            }
            for (&question, &weight) in questions {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(EvalError::InvalidWeight {
                        college: college.clone(),
                        question,
                        weight,
                    });
                }
            }
        }
        Ok(WeightTable { table: raw })
    }

    /// Load the table from its TOML form:
    ///
    /// ```toml
    /// [GCoE]
    /// 2 = 1.0
    /// 3 = 1.5
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: RawWeightTable = toml::from_str(s)?;
        Self::from_raw(raw)
    }

    /// Load the table from its JSON form (same nested shape as TOML).
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawWeightTable = serde_json::from_str(s)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawWeightTable) -> Result<Self> {
        let mut table = BTreeMap::new();
        for (college, questions) in raw.0 {
            let mut parsed = BTreeMap::new();
            for (question, weight) in questions {
                let number: u16 = question
                    .trim()
                    .parse()
                    .map_err(|_| EvalError::invalid_value("question number", &question))?;
                parsed.insert(number, weight);
            }
            table.insert(college, parsed);
        }
        Self::from_map(table)
    }

    /// Build an explicit all-ones table for deployments that do not
    /// differentiate questions.
    pub fn uniform<I, S>(colleges: I, questions: &[u16]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let per_college: BTreeMap<u16, f64> = questions.iter().map(|&q| (q, 1.0)).collect();
        let table = colleges
            .into_iter()
            .map(|c| (c.into(), per_college.clone()))
            .collect();
        Self::from_map(table)
    }

    /// Resolve the weight for a (college, question) pair.
    pub fn resolve(&self, college: &str, question: u16) -> Result<f64> {
        self.table
            .get(college)
            .and_then(|questions| questions.get(&question))
            .copied()
            .ok_or_else(|| EvalError::UnknownQuestionWeight {
                college: college.to_string(),
                question,
            })
    }

    /// College codes present in the table
    pub fn colleges(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resolve_known_pair() {
        let table = WeightTable::from_toml_str("[GCoE]\n2 = 1.0\n3 = 1.5\n").unwrap();
        assert_eq!(table.resolve("GCoE", 2).unwrap(), 1.0);
        assert_eq!(table.resolve("GCoE", 3).unwrap(), 1.5);
    }

    #[test]
    fn test_missing_question_fails_fast() {
        let table = WeightTable::from_toml_str("[GCoE]\n2 = 1.0\n").unwrap();
        let err = table.resolve("GCoE", 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = table.resolve("JRCoE", 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_bad_weights() {
        assert!(WeightTable::from_toml_str("[GCoE]\n2 = 0.0\n").is_err());
        assert!(WeightTable::from_toml_str("[GCoE]\n2 = -1.0\n").is_err());
        assert!(WeightTable::from_toml_str("[GCoE]\n2 = inf\n").is_err());
    }

    #[test]
    fn test_rejects_empty_college() {
        assert!(WeightTable::from_toml_str("[GCoE]\n").is_err());
    }

    #[test]
    fn test_uniform_table() {
        let table = WeightTable::uniform(["GCoE", "JRCoE"], &[1, 2, 3]).unwrap();
        assert_eq!(table.resolve("JRCoE", 3).unwrap(), 1.0);
        assert_eq!(table.colleges().count(), 2);
    }

    #[test]
    fn test_json_form() {
        let table = WeightTable::from_json_str(r#"{"GCoE": {"2": 2.0}}"#).unwrap();
        assert_eq!(table.resolve("GCoE", 2).unwrap(), 2.0);
    }
}
