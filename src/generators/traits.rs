//! Traits shared by the per-document-type records.

use chrono::NaiveDate;

use super::context::{ManualRecord, PlaceholderContext};
use super::schema::{ColumnMap, ColumnSchema};
use super::tabular::Row;
use crate::models::DocumentType;

/// Trait for validating request objects.
pub trait Validator {
    /// Validate the state of the object.
    fn validate(&self) -> Result<(), String>;
}

/// A typed record that can be built from a spreadsheet row or a manual form and rendered
/// into a template.
pub trait TemplateRecord: Validator + Sized {
    const DOCUMENT_TYPE: DocumentType;

    /// Layout of the spreadsheet this record is read from.
    fn schema() -> &'static ColumnSchema;

    fn from_row(columns: &ColumnMap, row: &Row) -> Self;

    fn from_manual(record: &ManualRecord) -> Self;

    /// Rows lacking their identity fields are skipped, not reported.
    fn is_eligible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Human name shown next to the generated file.
    fn display_name(&self) -> String;

    /// Name part of generated file names, before the random suffix.
    fn file_stem(&self) -> String;

    /// Full placeholder context, `cur_date` included.
    fn to_context(&self, generated_on: NaiveDate) -> PlaceholderContext;
}
