use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info, warn};
use sanitize_filename::sanitize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::documents::models::{download_url, SessionResponse};
use crate::documents::multipart_parser::{MultipartParser, ParsedGenerateForm, UploadedFile};
use crate::generators::{GenerationRequest, GeneratorError, ManualRecord, RecordSource};
use crate::models::{DataSource, DocumentType, OutputFormat};
use crate::registry::RegistryError;
use crate::{AppState, ErrorResponse};

const DOCUMENT_TYPE_FIELD: &str = "document_type";
const FORMAT_FIELD: &str = "file_format";
const SOURCE_FIELD: &str = "data_source";
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Return the upload if it carries a file name.
fn require_upload<'a>(
    upload: Option<&'a UploadedFile>,
    label: &str,
) -> Result<&'a UploadedFile, HttpResponse> {
    match upload {
        Some(file) if !file.original_filename.trim().is_empty() => Ok(file),
        _ => Err(HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request(&format!("Please upload a {}", label)))),
    }
}

fn require_extension(
    file: &UploadedFile,
    allowed: &[&str],
    label: &str,
) -> Result<(), HttpResponse> {
    let ext = extension_of(&file.original_filename);
    if allowed.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "Invalid {} '{}': expected one of {}",
            label,
            file.original_filename,
            allowed.join(", ")
        ))))
    }
}

fn parse_selector<T>(form: &ParsedGenerateForm, field: &str) -> Result<T, HttpResponse>
where
    T: std::str::FromStr<Err = String>,
{
    form.field(field)
        .parse()
        .map_err(|e: String| HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e)))
}

/// Text fields that are not selectors form the manual record.
fn manual_record(fields: &HashMap<String, String>) -> ManualRecord {
    fields
        .iter()
        .filter(|(key, _)| {
            !matches!(key.as_str(), DOCUMENT_TYPE_FIELD | FORMAT_FIELD | SOURCE_FIELD)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<HashMap<_, _>>()
        .into()
}

async fn save_upload(upload_dir: &Path, file: &UploadedFile) -> Result<PathBuf, String> {
    let path = upload_dir.join(format!(
        "{}_{}",
        Uuid::new_v4(),
        sanitize(&file.original_filename)
    ));
    let target = path.clone();
    let data = file.data.clone();
    web::block(move || std::fs::write(&target, data))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("Failed to save upload: {}", e))?;
    debug!("Saved upload to {}", path.display());
    Ok(path)
}

fn generation_error_response(err: &GeneratorError) -> HttpResponse {
    match err {
        GeneratorError::InvalidRecord(_) | GeneratorError::Schema(_) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
        _ => HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
            "Error generating documents: {}",
            err
        ))),
    }
}

fn registry_error_response(err: RegistryError) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    post,
    path = "/documents",
    request_body(content = inline(crate::documents::models::GenerateDocumentsForm), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Documents generated", body = SessionResponse),
        (status = 400, description = "Invalid upload or form field", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_documents(payload: Multipart, data: web::Data<AppState>) -> HttpResponse {
    info!("Executing generate_documents handler");

    let max_bytes = data.config.max_upload_bytes;
    let form = match MultipartParser::parse_generate_multipart(payload, max_bytes).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected generation form: {}", e);
            return e.into();
        }
    };

    let document_type: DocumentType = match parse_selector(&form, DOCUMENT_TYPE_FIELD) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let format: OutputFormat = match parse_selector(&form, FORMAT_FIELD) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let data_source: DataSource = match parse_selector(&form, SOURCE_FIELD) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let template = match require_upload(form.template_file.as_ref(), "template file").and_then(
        |file| {
            require_extension(file, document_type.template_extensions(), "template file")
                .map(|_| file)
        },
    ) {
        Ok(file) => file,
        Err(response) => return response,
    };

    let spreadsheet = if data_source == DataSource::Excel {
        match require_upload(form.excel_file.as_ref(), "spreadsheet file").and_then(|file| {
            require_extension(file, SPREADSHEET_EXTENSIONS, "spreadsheet file").map(|_| file)
        }) {
            Ok(file) => Some(file),
            Err(response) => return response,
        }
    } else {
        None
    };

    let upload_dir = &data.config.upload_dir;
    let template_path = match save_upload(upload_dir, template).await {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e));
        }
    };

    let source = match spreadsheet {
        Some(file) => match save_upload(upload_dir, file).await {
            Ok(path) => RecordSource::Spreadsheet(path),
            Err(e) => {
                error!("{}", e);
                return HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e));
            }
        },
        None => RecordSource::Manual(manual_record(&form.fields)),
    };

    let request = GenerationRequest {
        document_type,
        format,
        template: template_path,
        source,
    };

    match data.orchestrator.generate(request).await {
        Ok(manifest) => {
            let session_id = data.registry.store(manifest.clone()).await;
            info!(
                "Session {} holds {} generated {} files",
                session_id,
                manifest.len(),
                document_type
            );
            let mut response = SessionResponse::new(&session_id, &manifest);
            response.document_type = Some(document_type);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            error!("Generation of {} documents failed: {}", document_type, e);
            generation_error_response(&e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    get,
    path = "/documents/{session_id}",
    responses(
        (status = 200, description = "Files generated in this session", body = SessionResponse),
        (status = 404, description = "Session expired or unknown", body = ErrorResponse)
    ),
    params(
        ("session_id" = String, Path, description = "Session id returned by generation")
    )
)]
pub async fn get_session(
    session_id: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session_id = session_id.into_inner();
    match data.registry.lookup(&session_id).await {
        Ok(manifest) => HttpResponse::Ok().json(SessionResponse::new(&session_id, &manifest)),
        Err(e) => {
            debug!("Session {} not found", session_id);
            registry_error_response(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    delete,
    path = "/documents/{session_id}",
    responses(
        (status = 204, description = "Session discarded")
    ),
    params(
        ("session_id" = String, Path, description = "Session id returned by generation")
    )
)]
pub async fn delete_session(
    session_id: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session_id = session_id.into_inner();
    data.registry.discard(&session_id).await;
    info!("Discarded session {}", session_id);
    HttpResponse::NoContent().finish()
}

async fn serve_artifact(
    req: &HttpRequest,
    data: &AppState,
    session_id: &str,
    filename: &str,
    inline_when_viewable: bool,
) -> HttpResponse {
    let artifact = match data.registry.find_artifact(session_id, filename).await {
        Ok(artifact) => artifact,
        Err(e) => return registry_error_response(e),
    };

    let disposition = if inline_when_viewable && artifact.format.is_inline_viewable() {
        DispositionType::Inline
    } else {
        DispositionType::Attachment
    };

    match NamedFile::open_async(&artifact.path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition,
                parameters: vec![DispositionParam::Filename(artifact.filename.clone())],
            })
            .into_response(req),
        Err(e) => {
            warn!("Generated file {} is gone: {}", artifact.path.display(), e);
            HttpResponse::NotFound().json(ErrorResponse::not_found("File not found"))
        }
    }
}

#[utoipa::path(
    tag = "Document Service",
    get,
    path = "/download/{session_id}/{filename}",
    responses(
        (status = 200, description = "Generated file as attachment"),
        (status = 404, description = "Session or file not found", body = ErrorResponse)
    ),
    params(
        ("session_id" = String, Path, description = "Session id"),
        ("filename" = String, Path, description = "Generated file name")
    )
)]
pub async fn download_file(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let (session_id, filename) = path.into_inner();
    debug!("Download {} from session {}", filename, session_id);
    serve_artifact(&req, &data, &session_id, &filename, false).await
}

#[utoipa::path(
    tag = "Document Service",
    get,
    path = "/view/{session_id}/{filename}",
    responses(
        (status = 200, description = "Generated file, inline for images and PDFs"),
        (status = 404, description = "Session or file not found", body = ErrorResponse)
    ),
    params(
        ("session_id" = String, Path, description = "Session id"),
        ("filename" = String, Path, description = "Generated file name")
    )
)]
pub async fn view_file(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let (session_id, filename) = path.into_inner();
    debug!("View {} from session {}", filename, session_id);
    serve_artifact(&req, &data, &session_id, &filename, true).await
}

#[utoipa::path(
    tag = "Document Service",
    get,
    path = "/batch_download/{session_id}",
    responses(
        (status = 307, description = "Redirect to the first generated file"),
        (status = 404, description = "Session unknown or empty", body = ErrorResponse)
    ),
    params(
        ("session_id" = String, Path, description = "Session id")
    )
)]
pub async fn batch_download(
    session_id: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session_id = session_id.into_inner();
    let manifest = match data.registry.lookup(&session_id).await {
        Ok(manifest) => manifest,
        Err(e) => return registry_error_response(e),
    };

    match manifest.first() {
        Some(first) => HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, download_url(&session_id, &first.filename)))
            .finish(),
        None => HttpResponse::NotFound().json(ErrorResponse::not_found("No files to download")),
    }
}

#[utoipa::path(
    tag = "Document Service",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Routes under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/documents").route(web::post().to(generate_documents)))
        .service(
            web::resource("/documents/{session_id}")
                .route(web::get().to(get_session))
                .route(web::delete().to(delete_session)),
        );
}

/// Routes at the root: file serving and liveness.
pub fn file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/download/{session_id}/{filename}").route(web::get().to(download_file)),
    )
    .service(web::resource("/view/{session_id}/{filename}").route(web::get().to(view_file)))
    .service(web::resource("/batch_download/{session_id}").route(web::get().to(batch_download)))
    .service(web::resource("/health").route(web::get().to(health)));
}
