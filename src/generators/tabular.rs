//! Spreadsheet reader.
//!
//! Yields the first worksheet as rows of raw cell values, anchored at cell A1 so that
//! column positions match what the user sees in the sheet.

use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::fmt;
use std::path::Path;

use super::GeneratorError;

/// One raw spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Dates are kept pre-formatted.
    Date(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            // 95.0 reads as "95" in a transcript
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Date(date) => f.write_str(date),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(_) => match data.as_datetime() {
                Some(dt) if dt.time() == chrono::NaiveTime::MIN => {
                    Self::Date(dt.date().format("%Y-%m-%d").to_string())
                }
                Some(dt) => Self::Date(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Self::Empty,
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Date(s.clone()),
        }
    }
}

/// A spreadsheet row: raw cells addressed by zero-based column position.
pub type Row = Vec<CellValue>;

/// Read every row of the first worksheet, header row included.
pub fn read_rows(path: &Path) -> Result<Vec<Row>, GeneratorError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(GeneratorError::NoWorksheet)??;

    // calamine trims leading empty rows/columns; pad them back so positions line up with A1
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Row> = vec![Vec::new(); row_offset];
    for cells in range.rows() {
        let mut row = vec![CellValue::Empty; col_offset];
        row.extend(cells.iter().map(CellValue::from));
        rows.push(row);
    }

    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(95.0).to_string(), "95");
        assert_eq!(CellValue::Number(3.5).to_string(), "3.5");
    }

    #[test]
    fn test_blank_text_counts_as_empty() {
        assert!(CellValue::Text("   ".to_string()).is_empty());
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_from_calamine_data() {
        assert_eq!(
            CellValue::from(&Data::String("Ada".to_string())),
            CellValue::Text("Ada".to_string())
        );
        assert_eq!(CellValue::from(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
    }
}
