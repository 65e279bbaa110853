//! Instructor-in-section tier
//!
//! Groups normalized rows by (term, subject, course, instructor) and
//! collapses each group's questions and sections into one combined rating.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{EvalError, Result};
use crate::record::{InstructorAggregate, InstructorKey, NormalizedRecord};
use crate::report::RunReport;
use crate::stats;

pub(super) fn reduce(
    rows: &[NormalizedRecord],
    strict: bool,
    report: &mut RunReport,
) -> Result<Vec<InstructorAggregate>> {
    let mut groups: BTreeMap<InstructorKey, Vec<&NormalizedRecord>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.instructor_key()).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (key, group) in groups {
        match reduce_group(&key, &group) {
            Ok(aggregate) => out.push(aggregate),
            Err(err) if strict => {
                return Err(EvalError::GroupComputation {
                    tier: "instructor",
                    key: key.to_string(),
                    source: Box::new(err),
                })
            }
            Err(err) => {
                warn!(key = %key, error = %err, "skipped instructor group");
                report.record_skipped_group("instructor", key.to_string(), err);
            }
        }
    }
    Ok(out)
}

fn reduce_group(
    key: &InstructorKey,
    group: &[&NormalizedRecord],
) -> Result<InstructorAggregate> {
    // Repeated scans of the same section emit duplicate question rows; keep
    // one row per (section, question) pair
    let mut seen = BTreeSet::new();
    let mut rows: Vec<&NormalizedRecord> = Vec::with_capacity(group.len());
    for &row in group {
        if seen.insert((row.section_number.as_str(), row.question_number)) {
            rows.push(row);
        }
    }

    let means: Vec<f64> = rows.iter().map(|r| r.mean).collect();
    let sds: Vec<f64> = rows.iter().map(|r| r.sd).collect();
    let populations: Vec<f64> = rows.iter().map(|r| f64::from(r.responses)).collect();
    let weights: Vec<f64> = rows.iter().map(|r| r.weight).collect();

    let mean = stats::combine_mean(&means, &populations, &weights)?;
    let sd = stats::combine_sd(&sds, &means, &populations, &weights)?;

    // One enrollment figure per distinct section, so two sections of the same
    // course both count but repeated question rows within a section do not
    let mut per_section: BTreeMap<&str, u32> = BTreeMap::new();
    for row in &rows {
        let count = per_section.entry(row.section_number.as_str()).or_insert(0);
        *count = (*count).max(row.responses);
    }
    let enrollment = per_section.values().sum();

    let first = rows[0];
    Ok(InstructorAggregate {
        term: key.term,
        college: first.college.clone(),
        subject: key.subject.clone(),
        course_number: key.course_number.clone(),
        course_uuid: first.course_uuid.clone(),
        course_title: first.section_title.clone(),
        instructor_id: key.instructor_id,
        first_name: first.first_name.clone(),
        last_name: first.last_name.clone(),
        mean,
        sd,
        enrollment,
    })
}
