//! Associate-degree certificate records.
//!
//! Bilingual (Khmer / English) identity, birth date, program and education date.

use chrono::NaiveDate;

use super::common::{file_stem, format_long_date, CURRENT_DATE_PLACEHOLDER};
use super::context::{ManualRecord, PlaceholderContext};
use super::schema::{Column, ColumnMap, ColumnSchema};
use super::tabular::Row;
use super::traits::{TemplateRecord, Validator};
use crate::models::DocumentType;

static COLUMNS: [Column; 12] = [
    Column::new("id_kh", "ID (Khmer)", 0),
    Column::new("id_e", "ID (English)", 1),
    Column::new("name_kh", "Name (Khmer)", 2),
    Column::new("name_e", "Name (English)", 3),
    Column::new("g1", "Gender (Khmer)", 4),
    Column::new("g2", "Gender (English)", 5),
    Column::new("dob_kh", "Date of Birth (Khmer)", 6),
    Column::new("dob_e", "Date of Birth (English)", 7),
    Column::new("pro_kh", "Program (Khmer)", 8),
    Column::new("pro_e", "Program (English)", 9),
    Column::new("ed_kh", "Education Date (Khmer)", 10),
    Column::new("ed_e", "Education Date (English)", 11),
];

pub static ASSOCIATE_SCHEMA: ColumnSchema = ColumnSchema {
    name: "associate",
    version: 1,
    columns: &COLUMNS,
    header_only: false,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssociateRecord {
    pub id_kh: String,
    pub id_e: String,
    pub name_kh: String,
    pub name_e: String,
    pub g1: String,
    pub g2: String,
    pub dob_kh: String,
    pub dob_e: String,
    pub pro_kh: String,
    pub pro_e: String,
    pub ed_kh: String,
    pub ed_e: String,
}

impl Validator for AssociateRecord {
    fn validate(&self) -> Result<(), String> {
        use super::validation::*;

        let mut errors = ValidationErrors::new();
        validate_required(&self.name_e, "name_e", "English name", &mut errors);
        errors.into_result()
    }
}

impl TemplateRecord for AssociateRecord {
    const DOCUMENT_TYPE: DocumentType = DocumentType::Associate;

    fn schema() -> &'static ColumnSchema {
        &ASSOCIATE_SCHEMA
    }

    fn from_row(columns: &ColumnMap, row: &Row) -> Self {
        let get = |placeholder: &str| columns.text(row, placeholder);
        Self {
            id_kh: get("id_kh"),
            id_e: get("id_e"),
            name_kh: get("name_kh"),
            name_e: get("name_e"),
            g1: get("g1"),
            g2: get("g2"),
            dob_kh: get("dob_kh"),
            dob_e: get("dob_e"),
            pro_kh: get("pro_kh"),
            pro_e: get("pro_e"),
            ed_kh: get("ed_kh"),
            ed_e: get("ed_e"),
        }
    }

    fn from_manual(record: &ManualRecord) -> Self {
        Self {
            id_kh: record.text("id_kh"),
            id_e: record.first_of(&["id_e", "student_id"]),
            name_kh: record.text("name_kh"),
            name_e: record.first_of(&["name_e", "student_name"]),
            g1: record.text("g1"),
            g2: record.text("g2"),
            dob_kh: record.text("dob_kh"),
            dob_e: record.text("dob_e"),
            pro_kh: record.text("pro_kh"),
            pro_e: record.text("pro_e"),
            ed_kh: record.text("ed_kh"),
            ed_e: record.text("ed_e"),
        }
    }

    fn display_name(&self) -> String {
        self.name_e.clone()
    }

    fn file_stem(&self) -> String {
        file_stem(&self.name_e, "student")
    }

    fn to_context(&self, generated_on: NaiveDate) -> PlaceholderContext {
        let mut context = PlaceholderContext::new();
        context.insert("id_kh", self.id_kh.clone());
        context.insert("id_e", self.id_e.clone());
        context.insert("name_kh", self.name_kh.clone());
        context.insert("name_e", self.name_e.clone());
        context.insert("g1", self.g1.clone());
        context.insert("g2", self.g2.clone());
        context.insert("dob_kh", self.dob_kh.clone());
        context.insert("dob_e", self.dob_e.clone());
        context.insert("pro_kh", self.pro_kh.clone());
        context.insert("pro_e", self.pro_e.clone());
        context.insert("ed_kh", self.ed_kh.clone());
        context.insert("ed_e", self.ed_e.clone());
        context.insert(CURRENT_DATE_PLACEHOLDER, format_long_date(generated_on));
        context
    }
}
