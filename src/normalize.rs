//! Raw-row validation and normalization
//!
//! Turns loosely-typed ingestion rows into fully-typed `NormalizedRecord`s:
//! drops rows with missing required fields (no partial imputation), coerces
//! numeric codes and counts, title-cases instructor names, derives the
//! course and instructor identifiers, and resolves each row's question
//! weight. Every drop is counted in the run report under its reason.

use tracing::debug;

use crate::keys;
use crate::record::{NormalizedRecord, RawRecord};
use crate::report::{DropReason, RunReport};
use crate::term::TermCode;
use crate::weights::WeightTable;

/// Normalize a batch of raw rows, counting drops in `report`.
pub fn normalize_records(
    raw: &[RawRecord],
    weights: &WeightTable,
    report: &mut RunReport,
) -> Vec<NormalizedRecord> {
    let mut normalized = Vec::with_capacity(raw.len());
    for (index, row) in raw.iter().enumerate() {
        match normalize_row(row, weights) {
            Ok(record) => normalized.push(record),
            Err(reason) => {
                debug!(row = index, reason = ?reason, "dropped raw row");
                report.record_drop(reason);
            }
        }
    }
    debug!(
        rows_in = raw.len(),
        rows_out = normalized.len(),
        "normalization complete"
    );
    normalized
}

fn normalize_row(
    row: &RawRecord,
    weights: &WeightTable,
) -> std::result::Result<NormalizedRecord, DropReason> {
    let term_code = required_str(&row.term_code)?;
    let college = required_str(&row.college_code)?;
    let subject = required_str(&row.subject_code)?;
    let course_number = required_str(&row.course_number)?;
    let section_number = required_str(&row.section_number)?;
    let section_title = required_str(&row.section_title)?;
    let first_name = required_str(&row.instructor_first_name)?;
    let last_name = required_str(&row.instructor_last_name)?;
    let question_number = required_str(&row.question_number)?;
    let question_text = required_str(&row.question)?;

    let term: TermCode = term_code.parse().map_err(|_| DropReason::InvalidTerm)?;
    let question_number: u16 = question_number
        .parse()
        .map_err(|_| DropReason::Unparseable)?;

    let mean = row.mean.ok_or(DropReason::MissingField)?;
    let sd = row.standard_deviation.ok_or(DropReason::MissingField)?;
    if !mean.is_finite() || !sd.is_finite() || sd < 0.0 {
        return Err(DropReason::NonFiniteStat);
    }

    let responses = coerce_count(row.responses)?;
    let individual_responses = coerce_count(row.individual_responses)?;
    if responses == 0 {
        // Zero-population rows carry no statistical information; converting
        // them to a population of 1 would fabricate weight
        return Err(DropReason::ZeroResponses);
    }

    let weight = weights
        .resolve(&college, question_number)
        .map_err(|_| DropReason::UnknownQuestionWeight)?;

    let first_name = keys::title_case(&first_name);
    let last_name = keys::title_case(&last_name);
    let instructor_id = keys::instructor_id(&first_name, &last_name);
    let course_uuid = keys::course_uuid(&subject, &course_number, &section_title);

    Ok(NormalizedRecord {
        term,
        college,
        subject,
        course_number,
        section_number,
        section_title,
        course_uuid,
        instructor_id,
        first_name,
        last_name,
        question_number,
        question_text,
        mean,
        sd,
        responses,
        individual_responses,
        weight,
    })
}

fn required_str(field: &Option<String>) -> std::result::Result<String, DropReason> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DropReason::MissingField),
    }
}

/// Coerce a count supplied as a float to a non-negative integer.
/// Fractional parts are truncated, matching the upstream loader.
fn coerce_count(field: Option<f64>) -> std::result::Result<u32, DropReason> {
    let value = field.ok_or(DropReason::MissingField)?;
    if !value.is_finite() {
        return Err(DropReason::Unparseable);
    }
    if value < 0.0 {
        return Err(DropReason::NegativeCount);
    }
    Ok(value.trunc() as u32)
}
