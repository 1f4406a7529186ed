//! Award certificate records.
//!
//! A certificate only needs the recipient's name, taken from the `Name` column of the
//! spreadsheet or the `student_name` form field.

use chrono::NaiveDate;

use super::common::{file_stem, format_long_date, CURRENT_DATE_PLACEHOLDER};
use super::context::{ManualRecord, PlaceholderContext};
use super::schema::{Column, ColumnMap, ColumnSchema};
use super::tabular::Row;
use super::traits::{TemplateRecord, Validator};
use crate::models::DocumentType;

static COLUMNS: [Column; 1] = [Column::new("name", "Name", 0)];

pub static CERTIFICATE_SCHEMA: ColumnSchema = ColumnSchema {
    name: "certificate",
    version: 1,
    columns: &COLUMNS,
    header_only: true,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertificateRecord {
    pub name: String,
}

impl Validator for CertificateRecord {
    fn validate(&self) -> Result<(), String> {
        use super::validation::*;

        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "student_name", "Student name", &mut errors);
        errors.into_result()
    }
}

impl TemplateRecord for CertificateRecord {
    const DOCUMENT_TYPE: DocumentType = DocumentType::Certificate;

    fn schema() -> &'static ColumnSchema {
        &CERTIFICATE_SCHEMA
    }

    fn from_row(columns: &ColumnMap, row: &Row) -> Self {
        Self {
            name: columns.text(row, "name"),
        }
    }

    fn from_manual(record: &ManualRecord) -> Self {
        Self {
            name: record.first_of(&["student_name", "name"]),
        }
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn file_stem(&self) -> String {
        file_stem(&self.name, "certificate")
    }

    fn to_context(&self, generated_on: NaiveDate) -> PlaceholderContext {
        let mut context = PlaceholderContext::new();
        context.insert("name", self.name.clone());
        context.insert(CURRENT_DATE_PLACEHOLDER, format_long_date(generated_on));
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::schema::ColumnMode;
    use crate::generators::tabular::CellValue;

    #[test]
    fn test_name_column_is_found_by_header() {
        let header = vec![
            CellValue::Text("Email".to_string()),
            CellValue::Text("Name".to_string()),
        ];
        let columns = CERTIFICATE_SCHEMA
            .resolve(Some(&header), ColumnMode::Positional)
            .unwrap();
        let row = vec![
            CellValue::Text("ada@example.com".to_string()),
            CellValue::Text("  Ada Lovelace ".to_string()),
        ];

        let record = CertificateRecord::from_row(&columns, &row);
        assert_eq!(record.name, "Ada Lovelace");
        assert!(record.is_eligible());
    }

    #[test]
    fn test_manual_record_accepts_student_name() {
        let manual = ManualRecord::new().with("student_name", "Alan Turing");
        let record = CertificateRecord::from_manual(&manual);
        assert_eq!(record.name, "Alan Turing");
        assert_eq!(record.file_stem(), "Alan_Turing");
    }

    #[test]
    fn test_empty_name_fails_validation() {
        let record = CertificateRecord::default();
        assert!(record.validate().is_err());
        assert!(!record.is_eligible());
    }
}
