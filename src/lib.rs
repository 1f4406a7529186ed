use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod documents;
pub mod generators;
pub mod models;
pub mod registry;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::documents::handlers::generate_documents,
        crate::documents::handlers::get_session,
        crate::documents::handlers::delete_session,
        crate::documents::handlers::download_file,
        crate::documents::handlers::view_file,
        crate::documents::handlers::batch_download,
        crate::documents::handlers::health
    ),
    components(
        schemas(
            documents::models::GenerateDocumentsForm,
            documents::models::SessionResponse,
            documents::models::ArtifactResponse,
            models::DocumentType,
            models::OutputFormat,
            models::DataSource,
            models::ArtifactFormat,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Document Service", description = "Certificate, transcript and associate document generation.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost")
    )
)]
pub struct ApiDoc;

/// Register every route on an app. Shared by the server and the integration tests.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").configure(documents::handlers::config))
        .configure(documents::handlers::file_routes);
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    for dir in [&config.upload_dir, &config.generated_dir] {
        std::fs::create_dir_all(dir)?;
    }

    let bind_addr = (config.host.clone(), config.port);
    let app_state = web::Data::new(AppState::new(config));
    let registry = app_state.registry.clone();

    let prometheus = PrometheusMetricsBuilder::new("docgen_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    log::info!("Starting server at http://{}:{}", bind_addr.0, bind_addr.1);

    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure_app)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_addr)?
    .run()
    .await;

    registry.shutdown().await;
    result
}
