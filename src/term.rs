//! Term codes
//!
//! A term code is a six-digit integer `YYYYSS`: four-digit year followed by
//! a two-digit semester code (10 = Fall, 20 = Spring, 30 = Summer), e.g.
//! `201720` is Spring 2017.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Semester within an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    /// Semester code 10
    Fall,
    /// Semester code 20
    Spring,
    /// Semester code 30
    Summer,
}

impl Season {
    fn from_code(code: u32) -> Option<Season> {
        match code {
            10 => Some(Season::Fall),
            20 => Some(Season::Spring),
            30 => Some(Season::Summer),
            _ => None,
        }
    }

    /// Human-readable semester name
    pub fn name(&self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
        }
    }
}

/// A validated `YYYYSS` term code
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TermCode(u32);

impl TermCode {
    /// Create a term code from its integer form (with validation)
    pub fn new(code: u32) -> Result<Self> {
        let year = code / 100;
        let semester = code % 100;
        if !(1900..=9999).contains(&year) || Season::from_code(semester).is_none() {
            return Err(EvalError::InvalidTermCode(code));
        }
        Ok(TermCode(code))
    }

    /// The raw integer form
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Academic year (the `YYYY` digits)
    pub fn year(&self) -> u32 {
        self.0 / 100
    }

    /// Semester (the `SS` digits)
    pub fn season(&self) -> Season {
        // Validated at construction
        Season::from_code(self.0 % 100).unwrap_or(Season::Fall)
    }
}

impl FromStr for TermCode {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let code: u32 = s
            .trim()
            .parse()
            .map_err(|_| EvalError::invalid_value("term code", s))?;
        TermCode::new(code)
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season().name(), self.year())
    }
}
