//! Generators module - turns student records into certificates, transcripts and
//! associate-degree documents.
//!
//! Pipeline per request:
//! - `tabular` reads spreadsheet rows (or a manual record is supplied directly)
//! - `certificate` / `transcript` / `associate` map them onto typed records
//! - `raster` draws certificates, `docx` fills structured templates
//! - `engine` exports structured documents to PDF
//! - `orchestrator` drives the whole thing and assembles the `Manifest`

pub mod associate;
pub mod certificate;
pub mod common;
pub mod context;
pub mod docx;
pub mod engine;
pub mod orchestrator;
pub mod raster;
pub mod schema;
pub mod tabular;
pub mod traits;
pub mod transcript;
pub mod validation;

pub use associate::AssociateRecord;
pub use certificate::CertificateRecord;
pub use context::{ManualRecord, PlaceholderContext};
pub use engine::{FixedLayoutExporter, SofficeExporter};
pub use orchestrator::{GenerationOrchestrator, GenerationRequest, OutputDirs, RecordSource};
pub use schema::{ColumnMode, ColumnSchema, SchemaError};
pub use traits::{TemplateRecord, Validator};
pub use transcript::TranscriptRecord;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no worksheet")]
    NoWorksheet,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("failed to load template: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to read template archive: {0}")]
    TemplateArchive(#[from] zip::result::ZipError),
    #[error("template is malformed: {0}")]
    MalformedTemplate(String),
    #[error("template references placeholder '{0}' which is not provided")]
    MissingPlaceholder(String),
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write generated file: {0}")]
    Write(#[source] std::io::Error),
    #[error("PDF converter execution failed: {0}")]
    ConversionIo(#[source] std::io::Error),
    #[error("PDF converter exited with status {0}")]
    ConversionExit(i32),
    #[error("PDF conversion timed out after {0:?}")]
    ConversionTimeout(Duration),
    #[error("PDF converter produced no output at {0}")]
    ConversionOutputMissing(PathBuf),
    #[error("background render task failed: {0}")]
    Task(String),
}
