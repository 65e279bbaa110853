//! Department tier
//!
//! Groups course-tier rows by (term, subject), combines them with course
//! enrollment as the population, and broadcasts the department mean/sd back
//! onto every course row in the group.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{EvalError, Result};
use crate::record::{CourseAggregate, CourseKey, DepartmentAggregate, DepartmentKey};
use crate::report::RunReport;
use crate::stats;

/// Reduce course rows into department aggregates and broadcast the results.
///
/// Course rows whose department combination fails are removed from the
/// relation (and their keys returned) so they are never emitted with a
/// zeroed statistic.
pub(super) fn reduce(
    course_rows: &mut Vec<CourseAggregate>,
    strict: bool,
    report: &mut RunReport,
) -> Result<(Vec<DepartmentAggregate>, BTreeSet<CourseKey>)> {
    let mut groups: BTreeMap<DepartmentKey, Vec<usize>> = BTreeMap::new();
    for (index, row) in course_rows.iter().enumerate() {
        groups.entry(row.key().department_key()).or_default().push(index);
    }

    let mut departments = Vec::with_capacity(groups.len());
    let mut failed_departments: BTreeSet<DepartmentKey> = BTreeSet::new();
    let mut removed: BTreeSet<CourseKey> = BTreeSet::new();

    for (key, indices) in groups {
        match reduce_group(&key, &indices, course_rows) {
            Ok(department) => {
                for &index in &indices {
                    course_rows[index].department_mean = department.mean;
                    course_rows[index].department_sd = department.sd;
                }
                departments.push(department);
            }
            Err(err) if strict => {
                return Err(EvalError::GroupComputation {
                    tier: "department",
                    key: key.to_string(),
                    source: Box::new(err),
                })
            }
            Err(err) => {
                warn!(key = %key, error = %err, "skipped department group");
                report.record_skipped_group("department", key.to_string(), err);
                for &index in &indices {
                    removed.insert(course_rows[index].key());
                }
                failed_departments.insert(key);
            }
        }
    }

    if !failed_departments.is_empty() {
        course_rows.retain(|row| !failed_departments.contains(&row.key().department_key()));
    }

    Ok((departments, removed))
}

fn reduce_group(
    key: &DepartmentKey,
    indices: &[usize],
    course_rows: &[CourseAggregate],
) -> Result<DepartmentAggregate> {
    let group: Vec<&CourseAggregate> = indices.iter().map(|&i| &course_rows[i]).collect();

    let means: Vec<f64> = group.iter().map(|r| r.mean).collect();
    let sds: Vec<f64> = group.iter().map(|r| r.sd).collect();
    let populations: Vec<f64> = group.iter().map(|r| f64::from(r.enrollment)).collect();
    let weights = vec![1.0; group.len()];

    let mean = stats::combine_mean(&means, &populations, &weights)?;
    let sd = stats::combine_sd(&sds, &means, &populations, &weights)?;
    let enrollment = group.iter().map(|r| r.enrollment).sum();

    Ok(DepartmentAggregate {
        term: key.term,
        subject: key.subject.clone(),
        mean,
        sd,
        enrollment,
    })
}
