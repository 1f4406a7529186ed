use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use std::collections::HashMap;

use crate::ErrorResponse;

pub const EXCEL_FIELD: &str = "excel_file";
pub const TEMPLATE_FIELD: &str = "template_file";

/// An uploaded file held in memory until it is saved.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ParsedGenerateForm {
    /// Every text field, selectors and manual record fields alike.
    pub fields: HashMap<String, String>,
    pub excel_file: Option<UploadedFile>,
    pub template_file: Option<UploadedFile>,
}

impl ParsedGenerateForm {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::FieldError(_)
            | MultipartParseError::Utf8Error(_)
            | MultipartParseError::PayloadTooLarge(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Parse the generation form: two optional file fields plus free text fields.
    pub async fn parse_generate_multipart(
        mut multipart: Multipart,
        max_bytes: usize,
    ) -> Result<ParsedGenerateForm, MultipartParseError> {
        let mut form = ParsedGenerateForm::default();
        let mut total = 0usize;

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let maybe_filename = content_disposition.get_filename().map(|s| s.to_string());

            let mut buffer = Vec::new();
            while let Some(chunk) = field.next().await {
                let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                total += data_chunk.len();
                if total > max_bytes {
                    return Err(MultipartParseError::PayloadTooLarge(max_bytes));
                }
                buffer.extend_from_slice(&data_chunk);
            }

            match name.as_str() {
                EXCEL_FIELD | TEMPLATE_FIELD => {
                    let file = UploadedFile {
                        original_filename: maybe_filename.unwrap_or_default(),
                        data: buffer,
                    };
                    if name == EXCEL_FIELD {
                        form.excel_file = Some(file);
                    } else {
                        form.template_file = Some(file);
                    }
                }
                _ => {
                    let value = String::from_utf8(buffer)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}
