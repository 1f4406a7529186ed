//! Academic transcript records.
//!
//! Identity columns followed by 24 (subject, grade) pairs. The template receives the subject
//! cell under the subject placeholder (e.g. `logic`) and the grade cell under its grade
//! placeholder (e.g. `l_g`).

use chrono::NaiveDate;

use super::common::{file_stem, format_long_date, CURRENT_DATE_PLACEHOLDER};
use super::context::{ManualRecord, PlaceholderContext};
use super::schema::{Column, ColumnMap, ColumnSchema};
use super::tabular::Row;
use super::traits::{TemplateRecord, Validator};
use crate::models::DocumentType;

pub const SUBJECT_COUNT: usize = 24;

/// Subject placeholder, grade placeholder, in spreadsheet order.
pub const SUBJECTS: [(&str, &str); SUBJECT_COUNT] = [
    ("logic", "l_g"),
    ("bcum", "bc_g"),
    ("design", "d_g"),
    ("p1", "p1_g"),
    ("e1", "e1_g"),
    ("wd", "wd_g"),
    ("algo", "al_g"),
    ("p2", "p2_g"),
    ("e2", "e2_g"),
    ("sd", "sd_g"),
    ("js", "js_g"),
    ("php", "ph_g"),
    ("db", "db_g"),
    ("vc1", "v1_g"),
    ("node", "no_g"),
    ("e3", "e3_g"),
    ("p3", "p3_g"),
    ("oop", "op_g"),
    ("lar", "lar_g"),
    ("vue", "vu_g"),
    ("vc2", "v2_g"),
    ("e4", "e4_g"),
    ("p4", "p4_g"),
    ("int", "in_g"),
];

static COLUMNS: [Column; 3 + 2 * SUBJECT_COUNT] = [
    Column::new("student_id", "Student ID", 0),
    Column::new("first_name", "First Name", 1),
    Column::new("last_name", "Last Name", 2),
    Column::new("logic", "Logic", 3),
    Column::new("l_g", "Logic Grade", 4),
    Column::new("bcum", "Basic Computer", 5),
    Column::new("bc_g", "Basic Computer Grade", 6),
    Column::new("design", "Design", 7),
    Column::new("d_g", "Design Grade", 8),
    Column::new("p1", "Project 1", 9),
    Column::new("p1_g", "Project 1 Grade", 10),
    Column::new("e1", "English 1", 11),
    Column::new("e1_g", "English 1 Grade", 12),
    Column::new("wd", "Web Design", 13),
    Column::new("wd_g", "Web Design Grade", 14),
    Column::new("algo", "Algorithm", 15),
    Column::new("al_g", "Algorithm Grade", 16),
    Column::new("p2", "Project 2", 17),
    Column::new("p2_g", "Project 2 Grade", 18),
    Column::new("e2", "English 2", 19),
    Column::new("e2_g", "English 2 Grade", 20),
    Column::new("sd", "Software Development", 21),
    Column::new("sd_g", "Software Development Grade", 22),
    Column::new("js", "JavaScript", 23),
    Column::new("js_g", "JavaScript Grade", 24),
    Column::new("php", "PHP", 25),
    Column::new("ph_g", "PHP Grade", 26),
    Column::new("db", "Database", 27),
    Column::new("db_g", "Database Grade", 28),
    Column::new("vc1", "Version Control 1", 29),
    Column::new("v1_g", "Version Control 1 Grade", 30),
    Column::new("node", "Node.js", 31),
    Column::new("no_g", "Node.js Grade", 32),
    Column::new("e3", "English 3", 33),
    Column::new("e3_g", "English 3 Grade", 34),
    Column::new("p3", "Project 3", 35),
    Column::new("p3_g", "Project 3 Grade", 36),
    Column::new("oop", "OOP", 37),
    Column::new("op_g", "OOP Grade", 38),
    Column::new("lar", "Laravel", 39),
    Column::new("lar_g", "Laravel Grade", 40),
    Column::new("vue", "Vue.js", 41),
    Column::new("vu_g", "Vue.js Grade", 42),
    Column::new("vc2", "Version Control 2", 43),
    Column::new("v2_g", "Version Control 2 Grade", 44),
    Column::new("e4", "English 4", 45),
    Column::new("e4_g", "English 4 Grade", 46),
    Column::new("p4", "Project 4", 47),
    Column::new("p4_g", "Project 4 Grade", 48),
    Column::new("int", "Internship", 49),
    Column::new("in_g", "Internship Grade", 50),
];

pub static TRANSCRIPT_SCHEMA: ColumnSchema = ColumnSchema {
    name: "transcript",
    version: 1,
    columns: &COLUMNS,
    header_only: false,
};

/// One subject line of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GradeSlot {
    pub subject: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptRecord {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Indexed like [`SUBJECTS`].
    pub grades: [GradeSlot; SUBJECT_COUNT],
}

impl Validator for TranscriptRecord {
    fn validate(&self) -> Result<(), String> {
        use super::validation::*;

        let mut errors = ValidationErrors::new();
        validate_required(&self.first_name, "first_name", "First name", &mut errors);
        validate_required(&self.last_name, "last_name", "Last name", &mut errors);
        errors.into_result()
    }
}

impl TemplateRecord for TranscriptRecord {
    const DOCUMENT_TYPE: DocumentType = DocumentType::Transcript;

    fn schema() -> &'static ColumnSchema {
        &TRANSCRIPT_SCHEMA
    }

    fn from_row(columns: &ColumnMap, row: &Row) -> Self {
        Self {
            student_id: columns.text(row, "student_id"),
            first_name: columns.text(row, "first_name"),
            last_name: columns.text(row, "last_name"),
            grades: std::array::from_fn(|i| {
                let (subject, grade) = SUBJECTS[i];
                GradeSlot {
                    subject: columns.text(row, subject),
                    grade: columns.text(row, grade),
                }
            }),
        }
    }

    fn from_manual(record: &ManualRecord) -> Self {
        let (first_name, last_name) = record.split_name();
        Self {
            student_id: record.text("student_id"),
            first_name,
            last_name,
            grades: std::array::from_fn(|i| {
                let (subject, grade) = SUBJECTS[i];
                GradeSlot {
                    subject: record.text(subject),
                    grade: record.text(grade),
                }
            }),
        }
    }

    fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn file_stem(&self) -> String {
        file_stem(&format!("{}_{}", self.first_name, self.last_name), "student")
    }

    fn to_context(&self, generated_on: NaiveDate) -> PlaceholderContext {
        let mut context = PlaceholderContext::new();
        context.insert("student_id", self.student_id.clone());
        context.insert("first_name", self.first_name.clone());
        context.insert("last_name", self.last_name.clone());
        for (&(subject, grade), slot) in SUBJECTS.iter().zip(self.grades.iter()) {
            context.insert(subject, slot.subject.clone());
            context.insert(grade, slot.grade.clone());
        }
        context.insert(CURRENT_DATE_PLACEHOLDER, format_long_date(generated_on));
        context
    }
}
