//! PDF export engine.
//!
//! Handles the low-level details of invoking an out-of-process converter on a rendered
//! `.docx` and locating the produced PDF. Conversions are bounded by a timeout; a converter
//! that hangs is killed and reported as a failure for that record.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::GeneratorError;

pub const DEFAULT_CONVERTER: &str = "soffice";
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(120);

/// Converts a structured document into a fixed-layout PDF.
#[async_trait]
pub trait FixedLayoutExporter: Send + Sync {
    /// Export `document` to `<output_dir>/<document stem>.pdf` and return that path.
    async fn export(&self, document: &Path, output_dir: &Path) -> Result<PathBuf, GeneratorError>;
}

/// Path of the PDF an exporter is expected to produce for `document`.
pub fn pdf_path_for(document: &Path, output_dir: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}.pdf", stem))
}

/// LibreOffice headless converter.
pub struct SofficeExporter {
    binary: String,
    timeout: Duration,
}

impl SofficeExporter {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

impl Default for SofficeExporter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER, DEFAULT_CONVERSION_TIMEOUT)
    }
}

#[async_trait]
impl FixedLayoutExporter for SofficeExporter {
    async fn export(&self, document: &Path, output_dir: &Path) -> Result<PathBuf, GeneratorError> {
        let output_path = pdf_path_for(document, output_dir);
        log::debug!(
            "Converting {} to {}",
            document.display(),
            output_path.display()
        );

        let child = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(output_dir)
            .arg(document)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(GeneratorError::ConversionIo)?;

        // dropping the wait future on timeout kills the child
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GeneratorError::ConversionTimeout(self.timeout))?
            .map_err(GeneratorError::ConversionIo)?;

        if !output.status.success() {
            log::error!(
                "PDF converter failed for {}: {}",
                document.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(GeneratorError::ConversionExit(output.status.code().unwrap_or(-1)));
        }

        if !output_path.exists() {
            return Err(GeneratorError::ConversionOutputMissing(output_path));
        }

        Ok(output_path)
    }
}
