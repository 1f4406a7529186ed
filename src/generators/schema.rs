//! Declared spreadsheet layouts.
//!
//! Every spreadsheet-backed document type declares a versioned [`ColumnSchema`]. By default the
//! declared zero-based positions are used and header text is ignored. In [`ColumnMode::Header`]
//! the schema is resolved against the header row before any row is mapped, so a renamed or
//! missing column fails the request instead of silently shifting data into the wrong placeholder.

use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use super::tabular::{CellValue, Row};

/// How spreadsheet columns are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnMode {
    /// Match columns by header text.
    Header,
    /// Trust the declared positions and ignore header text.
    #[default]
    Positional,
}

impl FromStr for ColumnMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(Self::Header),
            "positional" => Ok(Self::Positional),
            other => Err(format!("unknown column mode '{}'", other)),
        }
    }
}

/// One declared column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Template placeholder the column feeds.
    pub placeholder: &'static str,
    /// Expected header text.
    pub header: &'static str,
    /// Legacy zero-based position.
    pub position: usize,
}

impl Column {
    pub const fn new(placeholder: &'static str, header: &'static str, position: usize) -> Self {
        Self {
            placeholder,
            header,
            position,
        }
    }

    fn matches(&self, header_cell: &str) -> bool {
        let cell = normalize_header(header_cell);
        !cell.is_empty()
            && (cell == normalize_header(self.header) || cell == normalize_header(self.placeholder))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("spreadsheet is empty: expected a header row for {schema} v{version}")]
    MissingHeader { schema: &'static str, version: u32 },
    #[error("spreadsheet is missing column '{header}' ({placeholder}) required by {schema} v{version}")]
    MissingColumn {
        schema: &'static str,
        version: u32,
        header: &'static str,
        placeholder: &'static str,
    },
}

/// Ordered, versioned list of the columns a document type reads.
#[derive(Debug)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub version: u32,
    pub columns: &'static [Column],
    /// Header-only schemas ignore [`ColumnMode::Positional`].
    pub header_only: bool,
}

impl ColumnSchema {
    /// Resolve declared columns against the header row.
    pub fn resolve(
        &self,
        header: Option<&Row>,
        mode: ColumnMode,
    ) -> Result<ColumnMap, SchemaError> {
        if mode == ColumnMode::Positional && !self.header_only {
            let positions = self
                .columns
                .iter()
                .map(|c| (c.placeholder, c.position))
                .collect();
            return Ok(ColumnMap { positions });
        }

        let header = header.ok_or(SchemaError::MissingHeader {
            schema: self.name,
            version: self.version,
        })?;

        let mut positions = HashMap::with_capacity(self.columns.len());
        for column in self.columns {
            let index = header
                .iter()
                .position(|cell| column.matches(&cell.to_string()))
                .ok_or(SchemaError::MissingColumn {
                    schema: self.name,
                    version: self.version,
                    header: column.header,
                    placeholder: column.placeholder,
                })?;
            positions.insert(column.placeholder, index);
        }

        Ok(ColumnMap { positions })
    }
}

/// Placeholder → resolved column position for one spreadsheet.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: HashMap<&'static str, usize>,
}

impl ColumnMap {
    pub fn position(&self, placeholder: &str) -> Option<usize> {
        self.positions.get(placeholder).copied()
    }

    /// Cell text for a placeholder; empty when the column or the cell is absent.
    pub fn text(&self, row: &Row, placeholder: &str) -> String {
        self.position(placeholder)
            .and_then(|index| row.get(index))
            .filter(|cell| !cell.is_empty())
            .map(CellValue::to_string)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

fn normalize_header(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
