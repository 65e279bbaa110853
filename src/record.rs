//! Record and aggregate row types
//!
//! `RawRecord` mirrors the loosely-typed documents the ingestion collaborator
//! supplies (one row per question per section per term); every field is
//! optional and numeric codes may arrive as strings. `NormalizedRecord` is
//! the fully-typed form produced by normalization. The three tier aggregates
//! and the flattened `AggregatedRecord` are the engine's output shapes; their
//! serde names match the stored column names downstream consumers read.

use serde::{Deserialize, Serialize};

use crate::term::TermCode;

/// One raw evaluation row as supplied by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Term Code")]
    pub term_code: Option<String>,
    #[serde(rename = "College Code")]
    pub college_code: Option<String>,
    #[serde(rename = "Subject Code")]
    pub subject_code: Option<String>,
    #[serde(rename = "Course Number")]
    pub course_number: Option<String>,
    #[serde(rename = "Section Number")]
    pub section_number: Option<String>,
    #[serde(rename = "Section Title")]
    pub section_title: Option<String>,
    #[serde(rename = "Instructor First Name")]
    pub instructor_first_name: Option<String>,
    #[serde(rename = "Instructor Last Name")]
    pub instructor_last_name: Option<String>,
    #[serde(rename = "Question Number")]
    pub question_number: Option<String>,
    #[serde(rename = "Question")]
    pub question: Option<String>,
    #[serde(rename = "Mean")]
    pub mean: Option<f64>,
    #[serde(rename = "Standard Deviation")]
    pub standard_deviation: Option<f64>,
    #[serde(rename = "Responses")]
    pub responses: Option<f64>,
    #[serde(rename = "Individual Responses")]
    pub individual_responses: Option<f64>,
}

/// A validated, fully-typed evaluation row with derived identifiers and the
/// resolved question weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub term: TermCode,
    pub college: String,
    pub subject: String,
    pub course_number: String,
    pub section_number: String,
    pub section_title: String,
    pub course_uuid: String,
    pub instructor_id: u32,
    pub first_name: String,
    pub last_name: String,
    pub question_number: u16,
    pub question_text: String,
    pub mean: f64,
    pub sd: f64,
    pub responses: u32,
    pub individual_responses: u32,
    pub weight: f64,
}

impl NormalizedRecord {
    /// Key of the instructor-in-section group this row contributes to
    pub fn instructor_key(&self) -> InstructorKey {
        InstructorKey {
            term: self.term,
            subject: self.subject.clone(),
            course_number: self.course_number.clone(),
            instructor_id: self.instructor_id,
        }
    }
}

/// Key of an instructor-in-section aggregate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InstructorKey {
    pub term: TermCode,
    pub subject: String,
    pub course_number: String,
    pub instructor_id: u32,
}

impl InstructorKey {
    /// The course this instructor group rolls up into
    pub fn course_key(&self) -> CourseKey {
        CourseKey {
            term: self.term,
            subject: self.subject.clone(),
            course_number: self.course_number.clone(),
        }
    }
}

impl std::fmt::Display for InstructorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.term.as_u32(),
            self.subject,
            self.course_number,
            self.instructor_id
        )
    }
}

/// Key of a course aggregate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CourseKey {
    pub term: TermCode,
    pub subject: String,
    pub course_number: String,
}

impl CourseKey {
    /// The department this course rolls up into
    pub fn department_key(&self) -> DepartmentKey {
        DepartmentKey {
            term: self.term,
            subject: self.subject.clone(),
        }
    }
}

impl std::fmt::Display for CourseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.term.as_u32(),
            self.subject,
            self.course_number
        )
    }
}

/// Key of a department aggregate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DepartmentKey {
    pub term: TermCode,
    pub subject: String,
}

impl std::fmt::Display for DepartmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.term.as_u32(), self.subject)
    }
}

/// Scope within which course ranks are assigned
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CohortKey {
    pub term: TermCode,
    pub college: String,
    pub subject: String,
}

/// One instructor's combined rating for one course in one term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorAggregate {
    pub term: TermCode,
    pub college: String,
    pub subject: String,
    pub course_number: String,
    pub course_uuid: String,
    pub course_title: String,
    pub instructor_id: u32,
    pub first_name: String,
    pub last_name: String,
    /// Combined mean over the group's questions and sections
    pub mean: f64,
    /// Pooled standard deviation over the group
    pub sd: f64,
    /// Sum of distinct-section response counts
    pub enrollment: u32,
}

impl InstructorAggregate {
    pub fn key(&self) -> InstructorKey {
        InstructorKey {
            term: self.term,
            subject: self.subject.clone(),
            course_number: self.course_number.clone(),
            instructor_id: self.instructor_id,
        }
    }
}

/// One course's combined rating for one term, with its cohort rank and the
/// broadcast department statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseAggregate {
    pub term: TermCode,
    pub college: String,
    pub subject: String,
    pub course_number: String,
    pub course_uuid: String,
    pub course_title: String,
    /// Combined mean over the course's instructors
    pub mean: f64,
    /// Pooled standard deviation over the course's instructors
    pub sd: f64,
    /// Sum of instructor enrollments
    pub enrollment: u32,
    /// Dense rank of the course mean within its (term, college, subject)
    /// cohort, descending; 1 is best
    pub rank: u32,
    /// Department mean, denormalized onto every course sharing the key
    pub department_mean: f64,
    /// Department standard deviation, denormalized likewise
    pub department_sd: f64,
}

impl CourseAggregate {
    pub fn key(&self) -> CourseKey {
        CourseKey {
            term: self.term,
            subject: self.subject.clone(),
            course_number: self.course_number.clone(),
        }
    }

    pub fn cohort_key(&self) -> CohortKey {
        CohortKey {
            term: self.term,
            college: self.college.clone(),
            subject: self.subject.clone(),
        }
    }
}

/// One department's combined rating for one term (intermediate relation;
/// the same values are broadcast onto its course rows).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentAggregate {
    pub term: TermCode,
    pub subject: String,
    pub mean: f64,
    pub sd: f64,
    pub enrollment: u32,
}

/// The flattened output row handed to the persistence collaborator: one row
/// per instructor-in-section key carrying all three tiers side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    #[serde(rename = "Term Code")]
    pub term_code: u32,
    #[serde(rename = "College Code")]
    pub college_code: String,
    #[serde(rename = "Subject Code")]
    pub subject_code: String,
    #[serde(rename = "Course Number")]
    pub course_number: String,
    #[serde(rename = "Course Title")]
    pub course_title: String,
    #[serde(rename = "course_uuid")]
    pub course_uuid: String,
    #[serde(rename = "Instructor ID")]
    pub instructor_id: u32,
    #[serde(rename = "Instructor First Name")]
    pub instructor_first_name: String,
    #[serde(rename = "Instructor Last Name")]
    pub instructor_last_name: String,
    #[serde(rename = "Avg Instructor Rating In Section")]
    pub instructor_mean: f64,
    #[serde(rename = "SD Instructor Rating In Section")]
    pub instructor_sd: f64,
    #[serde(rename = "Instructor Enrollment")]
    pub instructor_enrollment: u32,
    #[serde(rename = "Avg Course Rating")]
    pub course_mean: f64,
    #[serde(rename = "SD Course Rating")]
    pub course_sd: f64,
    #[serde(rename = "Course Enrollment")]
    pub course_enrollment: u32,
    #[serde(rename = "Course Rank in Department in Semester")]
    pub course_rank: u32,
    #[serde(rename = "Avg Department Rating")]
    pub department_mean: f64,
    #[serde(rename = "SD Department Rating")]
    pub department_sd: f64,
}
