//! Generation orchestrator.
//!
//! Drives reader → mapper → renderer → exporter for one request and assembles the
//! [`Manifest`]. Records are processed strictly in order; the first failure aborts the run and
//! no manifest is returned. Files written before the failure stay on disk unregistered.

use chrono::NaiveDate;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::certificate::CertificateRecord;
use super::common::{file_name_of, today, unique_output_path};
use super::context::{ManualRecord, PlaceholderContext};
use super::docx::DocxTemplate;
use super::engine::FixedLayoutExporter;
use super::raster::{CertificateRenderer, CertificateStyle};
use super::schema::ColumnMode;
use super::tabular::read_rows;
use super::traits::TemplateRecord;
use super::{AssociateRecord, GeneratorError, TranscriptRecord};
use crate::models::{Artifact, ArtifactFormat, DocumentType, Manifest, OutputFormat};

/// Where the records of a request come from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// Header row plus data rows.
    Spreadsheet(PathBuf),
    Manual(ManualRecord),
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub document_type: DocumentType,
    pub format: OutputFormat,
    pub template: PathBuf,
    pub source: RecordSource,
}

/// Output directory layout under the generated-files root.
#[derive(Debug, Clone)]
pub struct OutputDirs {
    root: PathBuf,
}

impl OutputDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn certificates(&self) -> PathBuf {
        self.root.join("Certificates")
    }

    /// Structured-document directory for a document type.
    pub fn documents(&self, document_type: DocumentType) -> PathBuf {
        match document_type {
            DocumentType::Certificate => self.certificates(),
            DocumentType::Transcript => self.root.join("Transcript_Doc"),
            DocumentType::Associate => self.root.join("Associate_Documents"),
        }
    }

    /// Fixed-layout directory for a document type.
    pub fn pdfs(&self, document_type: DocumentType) -> PathBuf {
        match document_type {
            DocumentType::Certificate => self.certificates(),
            DocumentType::Transcript => self.root.join("Transcript_PDF"),
            DocumentType::Associate => self.root.join("Associate_PDF"),
        }
    }
}

fn ensure_dir(path: &Path) -> Result<(), GeneratorError> {
    fs::create_dir_all(path).map_err(|source| GeneratorError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

pub struct GenerationOrchestrator {
    dirs: OutputDirs,
    style: CertificateStyle,
    column_mode: ColumnMode,
    exporter: Arc<dyn FixedLayoutExporter>,
}

impl GenerationOrchestrator {
    pub fn new(
        dirs: OutputDirs,
        style: CertificateStyle,
        column_mode: ColumnMode,
        exporter: Arc<dyn FixedLayoutExporter>,
    ) -> Self {
        Self {
            dirs,
            style,
            column_mode,
            exporter,
        }
    }

    pub fn dirs(&self) -> &OutputDirs {
        &self.dirs
    }

    /// Run one generation request to completion.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Manifest, GeneratorError> {
        let generated_on = today();
        log::info!(
            "Generating {} documents (format: {:?})",
            request.document_type,
            request.format
        );

        let manifest = match request.document_type {
            DocumentType::Certificate => self.generate_certificates(&request).await?,
            DocumentType::Transcript => {
                self.generate_documents::<TranscriptRecord>(&request, generated_on)
                    .await?
            }
            DocumentType::Associate => {
                self.generate_documents::<AssociateRecord>(&request, generated_on)
                    .await?
            }
        };

        log::info!(
            "Generated {} {} artifacts",
            manifest.len(),
            request.document_type
        );
        Ok(manifest)
    }

    async fn generate_certificates(
        &self,
        request: &GenerationRequest,
    ) -> Result<Manifest, GeneratorError> {
        let source = request.source.clone();
        let template_path = request.template.clone();
        let column_mode = self.column_mode;
        let output_dir = self.dirs.certificates();
        let style = self.style.clone();

        run_blocking(move || {
            let records = load_records::<CertificateRecord>(&source, column_mode)?;
            let template = image::open(&template_path)?;
            ensure_dir(&output_dir)?;
            render_certificates(&records, &template, &style, &output_dir)
        })
        .await
    }

    async fn generate_documents<R>(
        &self,
        request: &GenerationRequest,
        generated_on: NaiveDate,
    ) -> Result<Manifest, GeneratorError>
    where
        R: TemplateRecord + Send + 'static,
    {
        let document_type = R::DOCUMENT_TYPE;
        let doc_dir = self.dirs.documents(document_type);
        let pdf_dir = self.dirs.pdfs(document_type);

        let source = request.source.clone();
        let template_path = request.template.clone();
        let column_mode = self.column_mode;
        let dirs = [doc_dir.clone(), pdf_dir.clone()];
        let (records, template) = run_blocking(move || {
            let records = load_records::<R>(&source, column_mode)?;
            let template = DocxTemplate::open(&template_path)?;
            for dir in &dirs {
                ensure_dir(dir)?;
            }
            Ok((records, Arc::new(template)))
        })
        .await?;

        let mut manifest = Manifest::new();
        for record in &records {
            let context = record.to_context(generated_on);
            let name = record.display_name();
            let stem = record.file_stem();
            let prefix = document_type.as_str();
            log::debug!("Rendering {} with {} placeholders", name, context.placeholder_count());

            let mut rendered_doc = None;
            if request.format.wants_document() {
                let doc_path =
                    unique_output_path(&doc_dir, prefix, &stem, ArtifactFormat::Docx.extension());
                render_docx(&template, context.clone(), doc_path.clone()).await?;
                manifest.push(artifact(&name, document_type, ArtifactFormat::Docx, &doc_path));
                rendered_doc = Some(doc_path);
            }

            if request.format.wants_fixed_layout() {
                let pdf_path = match rendered_doc {
                    Some(doc_path) => self.exporter.export(&doc_path, &pdf_dir).await?,
                    None => {
                        // throwaway intermediate, removed with the scratch dir on every path
                        let scratch = tempfile::Builder::new()
                            .prefix(".render-")
                            .tempdir_in(&pdf_dir)
                            .map_err(GeneratorError::Write)?;
                        let target = unique_output_path(
                            &pdf_dir,
                            prefix,
                            &stem,
                            ArtifactFormat::Pdf.extension(),
                        );
                        let doc_path = scratch.path().join(file_name_of(
                            &target.with_extension(ArtifactFormat::Docx.extension()),
                        ));
                        render_docx(&template, context, doc_path.clone()).await?;
                        let pdf_path = self.exporter.export(&doc_path, &pdf_dir).await?;
                        scratch.close().map_err(GeneratorError::Write)?;
                        pdf_path
                    }
                };
                manifest.push(artifact(&name, document_type, ArtifactFormat::Pdf, &pdf_path));
            }
        }

        Ok(manifest)
    }
}

/// Eligible records of a source, in source order.
pub fn load_records<R: TemplateRecord>(
    source: &RecordSource,
    column_mode: ColumnMode,
) -> Result<Vec<R>, GeneratorError> {
    match source {
        RecordSource::Spreadsheet(path) => {
            let rows = read_rows(path)?;
            let columns = R::schema().resolve(rows.first(), column_mode)?;

            let mut records = Vec::new();
            for (index, row) in rows.iter().enumerate().skip(1) {
                let record = R::from_row(&columns, row);
                if record.is_eligible() {
                    records.push(record);
                } else {
                    log::debug!("Skipping row {}: missing identity fields", index + 1);
                }
            }
            Ok(records)
        }
        RecordSource::Manual(manual) => {
            let record = R::from_manual(manual);
            record.validate().map_err(GeneratorError::InvalidRecord)?;
            Ok(vec![record])
        }
    }
}

/// Run file and image work off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, GeneratorError>
where
    F: FnOnce() -> Result<T, GeneratorError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| GeneratorError::Task(e.to_string()))?
}

async fn render_docx(
    template: &Arc<DocxTemplate>,
    context: PlaceholderContext,
    path: PathBuf,
) -> Result<(), GeneratorError> {
    let template = Arc::clone(template);
    run_blocking(move || template.render_to_file(&context, &path)).await
}

fn render_certificates(
    records: &[CertificateRecord],
    template: &DynamicImage,
    style: &CertificateStyle,
    output_dir: &Path,
) -> Result<Manifest, GeneratorError> {
    let renderer = CertificateRenderer::new(style);
    let mut manifest = Manifest::new();

    for record in records {
        let path = unique_output_path(
            output_dir,
            DocumentType::Certificate.as_str(),
            &record.file_stem(),
            ArtifactFormat::Png.extension(),
        );
        renderer.render_to_file(template, &record.name, &path)?;
        manifest.push(artifact(
            &record.display_name(),
            DocumentType::Certificate,
            ArtifactFormat::Png,
            &path,
        ));
    }

    Ok(manifest)
}

fn artifact(
    name: &str,
    document_type: DocumentType,
    format: ArtifactFormat,
    path: &Path,
) -> Artifact {
    Artifact {
        name: name.to_string(),
        filename: file_name_of(path),
        document_type,
        format,
        path: path.to_path_buf(),
    }
}
