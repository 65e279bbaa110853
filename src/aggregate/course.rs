//! Course tier
//!
//! Groups instructor-tier rows by (term, subject, course) and combines them
//! with enrollment as the population; the explicit per-item weight is 1.
//! Rank and department fields are filled by later passes in the engine.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{EvalError, Result};
use crate::record::{CourseAggregate, CourseKey, InstructorAggregate};
use crate::report::RunReport;
use crate::stats;

pub(super) fn reduce(
    rows: &[InstructorAggregate],
    strict: bool,
    report: &mut RunReport,
) -> Result<(Vec<CourseAggregate>, BTreeSet<CourseKey>)> {
    let mut groups: BTreeMap<CourseKey, Vec<&InstructorAggregate>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.key().course_key()).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    let mut skipped = BTreeSet::new();
    for (key, group) in groups {
        match reduce_group(&key, &group) {
            Ok(aggregate) => out.push(aggregate),
            Err(err) if strict => {
                return Err(EvalError::GroupComputation {
                    tier: "course",
                    key: key.to_string(),
                    source: Box::new(err),
                })
            }
            Err(err) => {
                warn!(key = %key, error = %err, "skipped course group");
                report.record_skipped_group("course", key.to_string(), err);
                skipped.insert(key);
            }
        }
    }
    Ok((out, skipped))
}

fn reduce_group(key: &CourseKey, group: &[&InstructorAggregate]) -> Result<CourseAggregate> {
    let means: Vec<f64> = group.iter().map(|r| r.mean).collect();
    let sds: Vec<f64> = group.iter().map(|r| r.sd).collect();
    let populations: Vec<f64> = group.iter().map(|r| f64::from(r.enrollment)).collect();
    let weights = vec![1.0; group.len()];

    let mean = stats::combine_mean(&means, &populations, &weights)?;
    let sd = stats::combine_sd(&sds, &means, &populations, &weights)?;
    let enrollment = group.iter().map(|r| r.enrollment).sum();

    let first = group[0];
    Ok(CourseAggregate {
        term: key.term,
        college: first.college.clone(),
        subject: key.subject.clone(),
        course_number: key.course_number.clone(),
        course_uuid: first.course_uuid.clone(),
        course_title: first.course_title.clone(),
        mean,
        sd,
        enrollment,
        // Assigned by the rank pass
        rank: 0,
        // Assigned by the department broadcast
        department_mean: 0.0,
        department_sd: 0.0,
    })
}
