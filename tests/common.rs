#![allow(dead_code)]

use async_trait::async_trait;
use docgen_server::generators::engine::pdf_path_for;
use docgen_server::generators::raster::CertificateStyle;
use docgen_server::generators::{
    ColumnMode, FixedLayoutExporter, GenerationOrchestrator, GeneratorError, OutputDirs,
};
use docgen_server::{AppConfig, AppState};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Exporter that writes a stub PDF instead of running a converter.
#[derive(Default)]
pub struct FakeExporter {
    calls: AtomicUsize,
}

impl FakeExporter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FixedLayoutExporter for FakeExporter {
    async fn export(
        &self,
        document: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(document.exists(), "exported document must exist");
        let pdf = pdf_path_for(document, output_dir);
        std::fs::write(&pdf, b"%PDF-1.4\n%%EOF\n").map_err(GeneratorError::Write)?;
        Ok(pdf)
    }
}

/// Exporter that always fails like a converter exiting non-zero.
pub struct FailingExporter;

#[async_trait]
impl FixedLayoutExporter for FailingExporter {
    async fn export(
        &self,
        _document: &Path,
        _output_dir: &Path,
    ) -> Result<PathBuf, GeneratorError> {
        Err(GeneratorError::ConversionExit(1))
    }
}

pub fn test_style() -> CertificateStyle {
    CertificateStyle {
        font_path: PathBuf::from("does-not-exist.ttf"),
        font_size: 40.0,
        name_y: 100,
        color: Rgba([255, 165, 0, 255]),
    }
}

/// Orchestrator with the configured default column mode.
pub fn test_orchestrator(
    root: &Path,
    exporter: Arc<dyn FixedLayoutExporter>,
) -> GenerationOrchestrator {
    test_orchestrator_with_mode(root, exporter, AppConfig::default().column_mode)
}

pub fn test_orchestrator_with_mode(
    root: &Path,
    exporter: Arc<dyn FixedLayoutExporter>,
    column_mode: ColumnMode,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(
        OutputDirs::new(root.join("generated")),
        test_style(),
        column_mode,
        exporter,
    )
}

pub fn test_config(root: &Path) -> AppConfig {
    let config = AppConfig {
        upload_dir: root.join("uploads"),
        generated_dir: root.join("generated"),
        certificate_style: test_style(),
        ..AppConfig::default()
    };
    std::fs::create_dir_all(&config.upload_dir).unwrap();
    std::fs::create_dir_all(&config.generated_dir).unwrap();
    config
}

pub fn test_app_state(root: &Path) -> AppState {
    AppState::new_with_exporter(test_config(root), Arc::new(FakeExporter::default()))
}

/// Minimal word-processing package holding only a main body part.
pub fn build_docx(document_xml: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn write_docx_template(dir: &Path, name: &str, body: &str) -> PathBuf {
    let xml = format!(
        "<w:document><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
        body
    );
    let path = dir.join(name);
    std::fs::write(&path, build_docx(&xml)).unwrap();
    path
}

pub fn read_document_xml(path: &Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let white = Rgba([255, 255, 255, 255]);
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, white));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

pub fn write_png_template(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("certificate_template.png");
    std::fs::write(&path, png_bytes(width, height)).unwrap();
    path
}

/// Write rows of text cells to the first worksheet of a new workbook.
pub fn write_spreadsheet(dir: &Path, name: &str, rows: &[Vec<String>]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, value.as_str()).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();
    path
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

pub fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.extension().map_or(false, |ext| ext == extension))
                .collect()
        })
        .unwrap_or_default()
}
