//! Integration tests for the aggregation engine public API

use course_evals::record::RawRecord;
use course_evals::{Engine, WeightTable};

#[allow(clippy::too_many_arguments)]
fn raw(
    term: &str,
    college: &str,
    subject: &str,
    course: &str,
    section: &str,
    instructor: (&str, &str),
    question: u16,
    mean: f64,
    sd: f64,
    responses: f64,
) -> RawRecord {
    RawRecord {
        term_code: Some(term.to_string()),
        college_code: Some(college.to_string()),
        subject_code: Some(subject.to_string()),
        course_number: Some(course.to_string()),
        section_number: Some(section.to_string()),
        section_title: Some(format!("{} Intro {}", course, section)),
        instructor_first_name: Some(instructor.0.to_string()),
        instructor_last_name: Some(instructor.1.to_string()),
        question_number: Some(question.to_string()),
        question: Some("Overall quality".to_string()),
        mean: Some(mean),
        standard_deviation: Some(sd),
        responses: Some(responses),
        individual_responses: Some(responses),
    }
}

fn sample_dataset() -> Vec<RawRecord> {
    vec![
        // ENGR 2303, two instructors, one with two sections
        raw("201710", "GCoE", "ENGR", "2303", "001", ("Ada", "Lovelace"), 1, 4.2, 0.6, 28.0),
        raw("201710", "GCoE", "ENGR", "2303", "001", ("Ada", "Lovelace"), 2, 4.5, 0.5, 28.0),
        raw("201710", "GCoE", "ENGR", "2303", "002", ("Ada", "Lovelace"), 1, 3.9, 0.7, 31.0),
        raw("201710", "GCoE", "ENGR", "2303", "003", ("Alan", "Turing"), 1, 3.1, 0.9, 19.0),
        // ENGR 2313, one instructor
        raw("201710", "GCoE", "ENGR", "2313", "001", ("Grace", "Hopper"), 1, 4.8, 0.3, 45.0),
        raw("201710", "GCoE", "ENGR", "2313", "001", ("Grace", "Hopper"), 2, 4.6, 0.4, 45.0),
        // MATH department, same term, different college
        raw("201710", "CoAaS", "MATH", "1914", "010", ("Emmy", "Noether"), 1, 3.7, 0.8, 120.0),
        raw("201710", "CoAaS", "MATH", "2924", "010", ("Emmy", "Noether"), 1, 4.1, 0.6, 85.0),
        // Same course a year later
        raw("201810", "GCoE", "ENGR", "2303", "001", ("Ada", "Lovelace"), 1, 4.4, 0.5, 30.0),
    ]
}

fn weight_table() -> WeightTable {
    WeightTable::from_toml_str(
        r#"
[GCoE]
1 = 1.0
2 = 1.0

[CoAaS]
1 = 1.0
"#,
    )
    .unwrap()
}

#[test]
fn test_one_row_per_instructor_key() {
    let run = Engine::new(weight_table()).run(&sample_dataset()).unwrap();
    assert!(run.report.is_clean());

    // Distinct (term, subject, course, instructor) keys in the input
    assert_eq!(run.instructor_rows.len(), 6);
    assert_eq!(run.records.len(), 6);

    let mut keys: Vec<String> = run
        .instructor_rows
        .iter()
        .map(|r| r.key().to_string())
        .collect();
    keys.dedup();
    assert_eq!(keys.len(), 6, "instructor keys must be unique");
}

#[test]
fn test_course_and_department_tiers() {
    let run = Engine::new(weight_table()).run(&sample_dataset()).unwrap();

    // ENGR 2303 + 2313 in 201710, MATH 1914 + 2924 in 201710, ENGR 2303 in 201810
    assert_eq!(run.course_rows.len(), 5);
    // (201710, ENGR), (201710, MATH), (201810, ENGR)
    assert_eq!(run.department_rows.len(), 3);

    for department in &run.department_rows {
        let cohort: Vec<f64> = run
            .course_rows
            .iter()
            .filter(|c| c.term == department.term && c.subject == department.subject)
            .map(|c| c.mean)
            .collect();
        let lo = cohort.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = cohort.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(
            department.mean >= lo && department.mean <= hi,
            "department mean {} outside cohort bounds [{lo}, {hi}]",
            department.mean
        );
    }
}

#[test]
fn test_department_broadcast_onto_course_rows() {
    let run = Engine::new(weight_table()).run(&sample_dataset()).unwrap();

    for department in &run.department_rows {
        for course in run
            .course_rows
            .iter()
            .filter(|c| c.term == department.term && c.subject == department.subject)
        {
            assert_eq!(course.department_mean, department.mean);
            assert_eq!(course.department_sd, department.sd);
        }
    }
}

#[test]
fn test_rank_is_order_invariant() {
    let engine = Engine::new(weight_table());
    let forward = engine.run(&sample_dataset()).unwrap();

    let mut reversed = sample_dataset();
    reversed.reverse();
    let backward = engine.run(&reversed).unwrap();

    for course in &forward.course_rows {
        let twin = backward
            .course_rows
            .iter()
            .find(|c| c.key() == course.key())
            .expect("course present in both runs");
        assert_eq!(course.rank, twin.rank);
    }
}

#[test]
fn test_rerun_is_byte_identical() {
    let engine = Engine::new(weight_table());
    let a = engine.run(&sample_dataset()).unwrap();
    let b = engine.run(&sample_dataset()).unwrap();

    let bytes_a = serde_json::to_vec(&a).unwrap();
    let bytes_b = serde_json::to_vec(&b).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn test_permutation_produces_identical_output() {
    let engine = Engine::new(weight_table());
    let forward = engine.run(&sample_dataset()).unwrap();

    let mut shuffled = sample_dataset();
    shuffled.reverse();
    shuffled.rotate_left(3);
    let permuted = engine.run(&shuffled).unwrap();

    assert_eq!(
        serde_json::to_vec(&forward.records).unwrap(),
        serde_json::to_vec(&permuted.records).unwrap()
    );
}

#[test]
fn test_identifiers_stable_across_tiers_and_terms() {
    let run = Engine::new(weight_table()).run(&sample_dataset()).unwrap();

    // The same course content in different terms shares a course_uuid
    let uuids: Vec<&str> = run
        .course_rows
        .iter()
        .filter(|c| c.subject == "ENGR" && c.course_number == "2303")
        .map(|c| c.course_uuid.as_str())
        .collect();
    assert_eq!(uuids.len(), 2);
    assert_eq!(uuids[0], uuids[1]);

    // Flattened rows carry the same identifiers as the tier relations
    for record in &run.records {
        let course = run
            .course_rows
            .iter()
            .find(|c| {
                c.term.as_u32() == record.term_code
                    && c.subject == record.subject_code
                    && c.course_number == record.course_number
            })
            .unwrap();
        assert_eq!(record.course_uuid, course.course_uuid);
    }

    // Different courses get different identifiers
    let mut all_uuids: Vec<&str> = run
        .course_rows
        .iter()
        .map(|c| c.course_uuid.as_str())
        .collect();
    all_uuids.sort_unstable();
    all_uuids.dedup();
    // 5 course rows but 2303 appears in two terms with one uuid
    assert_eq!(all_uuids.len(), 4);
}

#[test]
fn test_ranks_scoped_to_college_cohort() {
    let run = Engine::new(weight_table()).run(&sample_dataset()).unwrap();

    // GCoE/ENGR 201710: 2313 (higher mean) ranks above 2303
    let rank_of = |term: u32, course: &str| {
        run.course_rows
            .iter()
            .find(|c| c.term.as_u32() == term && c.course_number == course)
            .map(|c| c.rank)
            .unwrap()
    };
    assert_eq!(rank_of(201710, "2313"), 1);
    assert_eq!(rank_of(201710, "2303"), 2);
    // MATH cohort is ranked independently
    assert_eq!(rank_of(201710, "2924"), 1);
    assert_eq!(rank_of(201710, "1914"), 2);
    // A single-course cohort ranks first
    assert_eq!(rank_of(201810, "2303"), 1);
}

#[test]
fn test_malformed_rows_reported_not_fatal() {
    let mut rows = sample_dataset();
    let mut missing = rows[0].clone();
    missing.instructor_last_name = None;
    let mut zero = rows[0].clone();
    zero.responses = Some(0.0);
    rows.push(missing);
    rows.push(zero);

    let run = Engine::new(weight_table()).run(&rows).unwrap();
    assert_eq!(run.report.rows_seen, 11);
    assert_eq!(run.report.rows_normalized, 9);
    assert_eq!(run.report.total_dropped(), 2);
    // The healthy rows aggregate exactly as before
    assert_eq!(run.records.len(), 6);
}
