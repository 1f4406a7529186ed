//! HTTP-level tests for the document routes.

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use common::*;
use docgen_server::configure_app;
use docgen_server::models::{Artifact, ArtifactFormat, DocumentType, Manifest};
use docgen_server::AppState;
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

const BOUNDARY: &str = "----docgen-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(parts: Vec<Part<'_>>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/documents")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

fn artifact_on_disk(dir: &Path, filename: &str, format: ArtifactFormat) -> Artifact {
    let path = dir.join(filename);
    std::fs::write(&path, b"generated").unwrap();
    Artifact {
        name: "Ada Lovelace".to_string(),
        filename: filename.to_string(),
        document_type: DocumentType::Transcript,
        format,
        path,
    }
}

async fn stored_session(state: &AppState, dir: &Path) -> String {
    let manifest = Manifest::from(vec![
        artifact_on_disk(dir, "transcript_Ada_Lovelace_0000abcd.docx", ArtifactFormat::Docx),
        artifact_on_disk(dir, "transcript_Ada_Lovelace_0000abcd.pdf", ArtifactFormat::Pdf),
    ]);
    state.registry.store(manifest).await
}

fn disposition(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_health() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unknown_session_is_not_found() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    for uri in [
        "/api/documents/no-such-session",
        "/download/no-such-session/file.pdf",
        "/view/no-such-session/file.pdf",
        "/batch_download/no-such-session",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn test_download_and_view_dispositions() {
    // Arrange
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let session_id = stored_session(&state, dir.path()).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    // Act
    let download = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/download/{}/transcript_Ada_Lovelace_0000abcd.pdf", session_id))
            .to_request(),
    )
    .await;
    let view_pdf = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/view/{}/transcript_Ada_Lovelace_0000abcd.pdf", session_id))
            .to_request(),
    )
    .await;
    let view_docx = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/view/{}/transcript_Ada_Lovelace_0000abcd.docx", session_id))
            .to_request(),
    )
    .await;

    // Assert
    assert_eq!(download.status(), StatusCode::OK);
    assert!(disposition(&download).starts_with("attachment"));
    assert_eq!(view_pdf.status(), StatusCode::OK);
    assert!(disposition(&view_pdf).starts_with("inline"));
    assert_eq!(view_docx.status(), StatusCode::OK);
    assert!(disposition(&view_docx).starts_with("attachment"));
}

#[actix_web::test]
async fn test_unlisted_or_deleted_file_is_not_found() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let session_id = stored_session(&state, dir.path()).await;
    std::fs::remove_file(dir.path().join("transcript_Ada_Lovelace_0000abcd.pdf")).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    let unlisted = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/download/{}/other.pdf", session_id))
            .to_request(),
    )
    .await;
    let deleted = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/download/{}/transcript_Ada_Lovelace_0000abcd.pdf", session_id))
            .to_request(),
    )
    .await;

    assert_eq!(unlisted.status(), StatusCode::NOT_FOUND);
    assert_eq!(deleted.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_batch_download_redirects_to_first_file() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let session_id = stored_session(&state, dir.path()).await;
    let empty_session = state.registry.store(Manifest::new()).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/batch_download/{}", session_id))
            .to_request(),
    )
    .await;
    let empty = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/batch_download/{}", empty_session))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("/download/{}/transcript_Ada_Lovelace_0000abcd.docx", session_id)
    );
    assert_eq!(empty.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_session_is_idempotent() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let session_id = stored_session(&state, dir.path()).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;
    let uri = format!("/api/documents/{}", session_id);

    let found = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(found.status(), StatusCode::OK);
    let body: Value = test::read_body_json(found).await;
    assert_eq!(body["file_count"], 2);

    for _ in 0..2 {
        let resp =
            test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let gone = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_generate_rejects_bad_forms() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    let cases = vec![
        vec![
            Part::Text("document_type", "diploma"),
            Part::File("template_file", "t.png", png_bytes(10, 10)),
        ],
        vec![
            Part::Text("document_type", "certificate"),
            Part::Text("data_source", "manual"),
            Part::Text("student_name", "Ada"),
        ],
        vec![
            Part::Text("document_type", "transcript"),
            Part::Text("data_source", "manual"),
            Part::File("template_file", "t.png", png_bytes(10, 10)),
        ],
        vec![
            Part::Text("document_type", "certificate"),
            Part::File("template_file", "t.png", png_bytes(10, 10)),
            Part::File("excel_file", "names.csv", b"Name\nAda".to_vec()),
        ],
        vec![
            Part::Text("document_type", "certificate"),
            Part::Text("file_format", "rtf"),
            Part::File("template_file", "t.png", png_bytes(10, 10)),
        ],
    ];

    for parts in cases {
        let resp = test::call_service(&app, multipart_request(parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_generate_manual_certificate() {
    // Arrange
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_app),
    )
    .await;

    // Act
    let resp = test::call_service(
        &app,
        multipart_request(vec![
            Part::Text("document_type", "certificate"),
            Part::Text("data_source", "manual"),
            Part::Text("student_name", "Ada Lovelace"),
            Part::File("template_file", "template.png", png_bytes(400, 200)),
        ])
        .to_request(),
    )
    .await;

    // Assert
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["document_type"], "certificate");
    assert_eq!(body["file_count"], 1);
    let session_id = body["session_id"].as_str().unwrap();
    let filename = body["files"][0]["filename"].as_str().unwrap();
    assert!(filename.starts_with("certificate_Ada_Lovelace_"));
    assert!(state.registry.find_artifact(session_id, filename).await.is_ok());

    let view = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(body["files"][0]["view_url"].as_str().unwrap())
            .to_request(),
    )
    .await;
    assert_eq!(view.status(), StatusCode::OK);
    assert!(disposition(&view).starts_with("inline"));
}

#[actix_web::test]
async fn test_manual_record_without_identity_is_rejected() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_app),
    )
    .await;

    let resp = test::call_service(
        &app,
        multipart_request(vec![
            Part::Text("document_type", "certificate"),
            Part::Text("data_source", "manual"),
            Part::File("template_file", "template.png", png_bytes(100, 50)),
        ])
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_generate_certificates_from_spreadsheet() {
    // Arrange
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let sheet = write_spreadsheet(
        dir.path(),
        "names.xlsx",
        &[row(&["Name"]), row(&["Ada Lovelace"]), row(&[""]), row(&["Alan Turing"])],
    );
    let sheet_bytes = std::fs::read(&sheet).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_app),
    )
    .await;

    // Act
    let resp = test::call_service(
        &app,
        multipart_request(vec![
            Part::Text("document_type", "certificate"),
            Part::Text("data_source", "excel"),
            Part::File("template_file", "template.png", png_bytes(400, 200)),
            Part::File("excel_file", "names.xlsx", sheet_bytes),
        ])
        .to_request(),
    )
    .await;

    // Assert
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["file_count"], 2);
    assert_eq!(body["files"][0]["name"], "Ada Lovelace");
    assert_eq!(body["files"][1]["name"], "Alan Turing");

    let download = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(body["files"][1]["download_url"].as_str().unwrap())
            .to_request(),
    )
    .await;
    assert_eq!(download.status(), StatusCode::OK);
    assert!(disposition(&download).starts_with("attachment"));
}

#[actix_web::test]
async fn test_links_work_for_names_with_reserved_characters() {
    let dir = tempdir().unwrap();
    let state = test_app_state(dir.path());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_app),
    )
    .await;

    let resp = test::call_service(
        &app,
        multipart_request(vec![
            Part::Text("document_type", "certificate"),
            Part::Text("data_source", "manual"),
            Part::Text("student_name", "Ada #1 100%"),
            Part::File("template_file", "template.png", png_bytes(400, 200)),
        ])
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    let view_url = body["files"][0]["view_url"].as_str().unwrap().to_string();
    assert!(!view_url.contains('#'));

    let view = test::call_service(&app, test::TestRequest::get().uri(&view_url).to_request()).await;
    assert_eq!(view.status(), StatusCode::OK);

    let batch = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/batch_download/{}", session_id))
            .to_request(),
    )
    .await;
    assert_eq!(batch.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = batch.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    let download =
        test::call_service(&app, test::TestRequest::get().uri(location).to_request()).await;
    assert_eq!(download.status(), StatusCode::OK);
}
