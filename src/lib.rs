use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use env_logger::Env;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod metrics;
pub mod render;
pub mod template;
pub mod validation;
pub mod variables;

pub use crate::db::AppState;

use crate::config::EngineConfig;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Number of the already existing document on an `AlreadyExists` conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            document_number: None,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::template::handlers::list_document_types,
        crate::template::handlers::create_document_type,
        crate::template::handlers::list_templates_by_type,
        crate::template::handlers::get_default_template,
        crate::template::handlers::get_template_by_name,
        crate::template::handlers::ensure_template,
        crate::template::handlers::list_templates,
        crate::template::handlers::create_template,
        crate::template::handlers::get_template,
        crate::template::handlers::list_clauses,
        crate::template::handlers::create_clause,
        crate::render::handlers::render_template,
        crate::variables::handlers::resolve_variables,
        crate::document::handlers::generate_document,
        crate::document::handlers::list_documents,
        crate::document::handlers::get_document,
        crate::document::handlers::delete_document,
        crate::document::handlers::update_status
    ),
    components(
        schemas(
            template::models::DocumentType,
            template::models::Template,
            template::models::Clause,
            template::models::CreateDocumentTypeRequest,
            template::models::CreateTemplateRequest,
            template::models::CreateClauseRequest,
            template::handlers::EnsureTemplateResponse,
            variables::resolver::RentalContext,
            variables::resolver::ClientInfo,
            variables::resolver::VehicleInfo,
            variables::resolver::RentalInfo,
            variables::resolver::FranchiseeInfo,
            variables::Variables,
            document::models::DocumentStatus,
            document::models::GeneratedDocument,
            document::models::StatusPatch,
            document::models::GenerateDocumentRequest,
            document::models::UpdateStatusRequest,
            render::handlers::RenderedFile,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Templates", description = "Document types, templates and clauses."),
        (name = "Variables", description = "Placeholder resolution from rental records."),
        (name = "Rendering", description = "PDF rendering of templates."),
        (name = "Documents", description = "Generated documents and their status workflow.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost")
    )
)]
pub struct ApiDoc;

/// Every `/api` route. Shared by the server and the HTTP tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(template::handlers::config)
        .configure(render::handlers::config)
        .configure(variables::handlers::config)
        .configure(document::handlers::config);
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let bind_address = config.bind_address.clone();

    let app_state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to open the document store. Check DATABASE_URL and that the database is running. Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = template::seed_catalog(&app_state.templates).await {
        log::warn!("Template catalog seeding failed: {}", e);
    }
    let app_state = web::Data::new(app_state);

    let prometheus = PrometheusMetricsBuilder::new("rental_docs_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    log::info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(configure_api))
            .configure(metrics::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_address)?
    .run()
    .await
}
