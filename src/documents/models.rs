use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Artifact, ArtifactFormat, DocumentType, Manifest};

/// One generated file as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArtifactResponse {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "certificate_Ada_Lovelace_1a2b3c4d.png")]
    pub filename: String,
    pub document_type: DocumentType,
    pub format: ArtifactFormat,
    #[schema(example = "/download/6f1c.../certificate_Ada_Lovelace_1a2b3c4d.png")]
    pub download_url: String,
    #[schema(example = "/view/6f1c.../certificate_Ada_Lovelace_1a2b3c4d.png")]
    pub view_url: String,
}

impl ArtifactResponse {
    pub fn new(session_id: &str, artifact: &Artifact) -> Self {
        Self {
            name: artifact.name.clone(),
            filename: artifact.filename.clone(),
            document_type: artifact.document_type,
            format: artifact.format,
            download_url: download_url(session_id, &artifact.filename),
            view_url: view_url(session_id, &artifact.filename),
        }
    }
}

/// Generated names may contain `#` or `%`, so the name segment is percent-encoded.
pub fn download_url(session_id: &str, filename: &str) -> String {
    format!("/download/{}/{}", session_id, urlencoding::encode(filename))
}

pub fn view_url(session_id: &str, filename: &str) -> String {
    format!("/view/{}/{}", session_id, urlencoding::encode(filename))
}

/// Result of a generation request, or of looking a session up again.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    #[schema(example = "6f1c2a9e-0d3b-4e8f-9a51-2b7c4d6e8f10")]
    pub session_id: String,
    pub document_type: Option<DocumentType>,
    pub file_count: usize,
    pub files: Vec<ArtifactResponse>,
}

impl SessionResponse {
    pub fn new(session_id: &str, manifest: &Manifest) -> Self {
        Self {
            session_id: session_id.to_string(),
            document_type: manifest.first().map(|a| a.document_type),
            file_count: manifest.len(),
            files: manifest
                .artifacts()
                .iter()
                .map(|a| ArtifactResponse::new(session_id, a))
                .collect(),
        }
    }
}

/// Multipart form accepted by `POST /api/documents`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct GenerateDocumentsForm {
    /// certificate | transcript | associate
    #[schema(example = "transcript")]
    pub document_type: String,
    /// doc | pdf | both (default both)
    #[schema(example = "both")]
    pub file_format: Option<String>,
    /// excel | manual (default excel)
    #[schema(example = "excel")]
    pub data_source: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub template_file: Vec<u8>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub excel_file: Option<Vec<u8>>,
    /// Manual record fields (student_name, student_id, first_name, last_name, name_kh, ...)
    #[schema(example = "Ada Lovelace")]
    pub student_name: Option<String>,
}
