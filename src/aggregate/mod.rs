//! Hierarchical weighted-statistics aggregation
//!
//! Rolls raw question-level rows up three tiers: instructor-in-section,
//! course, then department, each tier an explicit group-then-reduce over the
//! previous tier's output. Tiers run strictly in sequence; a tier never
//! starts until the one below it is complete. Normalized rows are sorted
//! into a canonical order first, so the whole pipeline is deterministic and
//! invariant under input permutation.

mod course;
mod department;
mod instructor;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::normalize;
use crate::rank;
use crate::record::{
    AggregatedRecord, CohortKey, CourseAggregate, CourseKey, DepartmentAggregate,
    InstructorAggregate, NormalizedRecord, RawRecord,
};
use crate::report::{DropReason, RunReport};
use crate::weights::WeightTable;

/// Engine behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Abort the run on the first failed group instead of the default
    /// skip-and-report behavior
    pub strict: bool,
}

/// The aggregation engine: a full-batch recompute from raw rows to the three
/// tier relations plus the flattened output records.
#[derive(Debug, Clone)]
pub struct Engine {
    weights: WeightTable,
    options: EngineOptions,
}

/// Output of one aggregation run: the three immutable tier relations, the
/// flattened records handed to the persistence collaborator, and the report
/// of everything dropped or skipped.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationRun {
    pub instructor_rows: Vec<InstructorAggregate>,
    pub course_rows: Vec<CourseAggregate>,
    pub department_rows: Vec<DepartmentAggregate>,
    pub records: Vec<AggregatedRecord>,
    pub report: RunReport,
}

impl Engine {
    /// Create an engine with default (lenient) options
    pub fn new(weights: WeightTable) -> Self {
        Self::with_options(weights, EngineOptions::default())
    }

    pub fn with_options(weights: WeightTable, options: EngineOptions) -> Self {
        Engine { weights, options }
    }

    /// Run the full batch recompute over a sequence of raw records.
    ///
    /// In lenient mode (the default) the result is always a complete table
    /// plus a report of dropped rows and skipped groups; in strict mode the
    /// first failed group aborts the run with an error naming its key.
    pub fn run(&self, raw: &[RawRecord]) -> Result<AggregationRun> {
        let strict = self.options.strict;
        let mut report = RunReport::new();
        report.rows_seen = raw.len();

        let mut rows = normalize::normalize_records(raw, &self.weights, &mut report);
        report.rows_normalized = rows.len();
        canonical_sort(&mut rows);

        let instructor_rows = instructor::reduce(&rows, strict, &mut report)?;
        debug!(groups = instructor_rows.len(), "instructor tier complete");

        let (mut course_rows, mut skipped_courses) =
            course::reduce(&instructor_rows, strict, &mut report)?;
        enforce_course_uniqueness(&mut course_rows, &mut skipped_courses, strict, &mut report)?;
        debug!(groups = course_rows.len(), "course tier complete");

        let (department_rows, removed) =
            department::reduce(&mut course_rows, strict, &mut report)?;
        skipped_courses.extend(removed);
        debug!(groups = department_rows.len(), "department tier complete");

        assign_ranks(&mut course_rows);

        let records = flatten(
            &instructor_rows,
            &course_rows,
            &skipped_courses,
            strict,
            &mut report,
        )?;
        report.rows_emitted = records.len();
        debug!(
            rows_emitted = report.rows_emitted,
            dropped = report.total_dropped(),
            skipped_groups = report.skipped_groups.len(),
            "aggregation run complete"
        );

        Ok(AggregationRun {
            instructor_rows,
            course_rows,
            department_rows,
            records,
            report,
        })
    }
}

/// Sort normalized rows into canonical key order so grouping, first-row
/// selection, and dedupe are independent of input order.
fn canonical_sort(rows: &mut [NormalizedRecord]) {
    rows.sort_by(|a, b| {
        (
            a.term,
            &a.subject,
            &a.course_number,
            a.instructor_id,
            &a.section_number,
            a.question_number,
        )
            .cmp(&(
                b.term,
                &b.subject,
                &b.course_number,
                b.instructor_id,
                &b.section_number,
                b.question_number,
            ))
            .then_with(|| a.mean.total_cmp(&b.mean))
            .then_with(|| a.sd.total_cmp(&b.sd))
            .then_with(|| a.responses.cmp(&b.responses))
    });
}

/// Exactly one course row per key is a hard invariant; offending rows are
/// dropped from both relations, never silently picked between.
fn enforce_course_uniqueness(
    course_rows: &mut Vec<CourseAggregate>,
    skipped: &mut BTreeSet<CourseKey>,
    strict: bool,
    report: &mut RunReport,
) -> Result<()> {
    let mut counts: BTreeMap<CourseKey, usize> = BTreeMap::new();
    for row in course_rows.iter() {
        *counts.entry(row.key()).or_insert(0) += 1;
    }

    let mut violated = false;
    for (key, found) in counts.into_iter().filter(|(_, n)| *n > 1) {
        if strict {
            return Err(EvalError::CardinalityViolation {
                key: key.to_string(),
                found,
            });
        }
        warn!(key = %key, found, "duplicate course rows dropped");
        for _ in 0..found {
            report.record_drop(DropReason::CardinalityViolation);
        }
        skipped.insert(key);
        violated = true;
    }
    if violated {
        course_rows.retain(|row| !skipped.contains(&row.key()));
    }
    Ok(())
}

/// Assign dense descending ranks to course means within each
/// (term, college, subject) cohort.
fn assign_ranks(course_rows: &mut [CourseAggregate]) {
    let mut cohorts: BTreeMap<CohortKey, Vec<usize>> = BTreeMap::new();
    for (index, row) in course_rows.iter().enumerate() {
        cohorts.entry(row.cohort_key()).or_default().push(index);
    }
    for indices in cohorts.values() {
        let means: Vec<f64> = indices.iter().map(|&i| course_rows[i].mean).collect();
        let ranks = rank::dense_rank_desc(&means);
        for (&index, rank) in indices.iter().zip(ranks) {
            course_rows[index].rank = rank;
        }
    }
}

/// Join each instructor row to its course row and emit the flattened output
/// shape: one record per instructor key carrying all three tiers.
fn flatten(
    instructor_rows: &[InstructorAggregate],
    course_rows: &[CourseAggregate],
    skipped_courses: &BTreeSet<CourseKey>,
    strict: bool,
    report: &mut RunReport,
) -> Result<Vec<AggregatedRecord>> {
    let by_course: BTreeMap<CourseKey, &CourseAggregate> =
        course_rows.iter().map(|row| (row.key(), row)).collect();

    let mut records = Vec::with_capacity(instructor_rows.len());
    for row in instructor_rows {
        let key = row.key().course_key();
        let course = match by_course.get(&key) {
            Some(course) => course,
            None if skipped_courses.contains(&key) => {
                // Already reported when the group was skipped
                continue;
            }
            None => {
                if strict {
                    return Err(EvalError::CardinalityViolation {
                        key: key.to_string(),
                        found: 0,
                    });
                }
                warn!(key = %key, "instructor row has no course row");
                report.record_drop(DropReason::CardinalityViolation);
                continue;
            }
        };

        records.push(AggregatedRecord {
            term_code: row.term.as_u32(),
            college_code: course.college.clone(),
            subject_code: row.subject.clone(),
            course_number: row.course_number.clone(),
            course_title: course.course_title.clone(),
            course_uuid: course.course_uuid.clone(),
            instructor_id: row.instructor_id,
            instructor_first_name: row.first_name.clone(),
            instructor_last_name: row.last_name.clone(),
            instructor_mean: row.mean,
            instructor_sd: row.sd,
            instructor_enrollment: row.enrollment,
            course_mean: course.mean,
            course_sd: course.sd,
            course_enrollment: course.enrollment,
            course_rank: course.rank,
            department_mean: course.department_mean,
            department_sd: course.department_sd,
        });
    }
    Ok(records)
}
