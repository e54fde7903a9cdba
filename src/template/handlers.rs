use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::models::{
    Clause, CreateClauseRequest, CreateDocumentTypeRequest, CreateTemplateRequest, DocumentType,
    Template,
};
use crate::error::EngineError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct EnsureTemplateResponse {
    pub template_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/document-types",
    tag = "Templates",
    responses(
        (status = 200, description = "Active document types", body = Vec<DocumentType>)
    )
)]
pub async fn list_document_types(state: web::Data<AppState>) -> Result<HttpResponse, EngineError> {
    let types = state.templates.list_document_types().await?;
    Ok(HttpResponse::Ok().json(types))
}

#[utoipa::path(
    post,
    path = "/api/document-types",
    tag = "Templates",
    request_body = CreateDocumentTypeRequest,
    responses(
        (status = 201, description = "Document type created", body = DocumentType),
        (status = 400, description = "Invalid request", body = crate::ErrorResponse)
    )
)]
pub async fn create_document_type(
    state: web::Data<AppState>,
    body: web::Json<CreateDocumentTypeRequest>,
) -> Result<HttpResponse, EngineError> {
    let created = state.templates.create_document_type(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/document-types/{id}/templates",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "Document type id")),
    responses(
        (status = 200, description = "Active templates of the type", body = Vec<Template>),
        (status = 404, description = "Document type not found", body = crate::ErrorResponse)
    )
)]
pub async fn list_templates_by_type(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, EngineError> {
    let templates = state.templates.list_templates_by_type(&path).await?;
    Ok(HttpResponse::Ok().json(templates))
}

#[utoipa::path(
    get,
    path = "/api/templates/default/{category}",
    tag = "Templates",
    params(("category" = String, Path, description = "Document type category, e.g. rental")),
    responses(
        (status = 200, description = "Default template of the category", body = Template),
        (status = 404, description = "No default template", body = crate::ErrorResponse)
    )
)]
pub async fn get_default_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let template = state.templates.get_default_template(&path).await?;
    Ok(HttpResponse::Ok().json(template))
}

#[utoipa::path(
    get,
    path = "/api/templates/by-name/{name}",
    tag = "Templates",
    params(("name" = String, Path, description = "Template name")),
    responses(
        (status = 200, description = "Template found", body = Template),
        (status = 404, description = "Template not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_template_by_name(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let template = state.templates.get_template_by_name(&path).await?;
    Ok(HttpResponse::Ok().json(template))
}

#[utoipa::path(
    post,
    path = "/api/templates/by-name/{name}/ensure",
    tag = "Templates",
    params(("name" = String, Path, description = "Catalog template name")),
    responses(
        (status = 200, description = "Template exists with its clauses", body = EnsureTemplateResponse),
        (status = 404, description = "Unknown template name", body = crate::ErrorResponse)
    )
)]
pub async fn ensure_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let template_id = state.templates.get_or_create_by_name(&path).await?;
    Ok(HttpResponse::Ok().json(EnsureTemplateResponse { template_id }))
}

#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "All templates", body = Vec<Template>)
    )
)]
pub async fn list_templates(state: web::Data<AppState>) -> Result<HttpResponse, EngineError> {
    let templates = state.templates.list_templates().await?;
    Ok(HttpResponse::Ok().json(templates))
}

#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = Template),
        (status = 400, description = "Invalid request", body = crate::ErrorResponse),
        (status = 412, description = "No document type available", body = crate::ErrorResponse)
    )
)]
pub async fn create_template(
    state: web::Data<AppState>,
    body: web::Json<CreateTemplateRequest>,
) -> Result<HttpResponse, EngineError> {
    let template = state.templates.create_template(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(template))
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template found", body = Template),
        (status = 404, description = "Template not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_template(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, EngineError> {
    let template = state.templates.get_template_by_id(&path).await?;
    Ok(HttpResponse::Ok().json(template))
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}/clauses",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "Template id")),
    responses(
        (status = 200, description = "Clauses in render order", body = Vec<Clause>),
        (status = 404, description = "Template not found", body = crate::ErrorResponse)
    )
)]
pub async fn list_clauses(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, EngineError> {
    let clauses = state.templates.list_clauses(&path).await?;
    Ok(HttpResponse::Ok().json(clauses))
}

#[utoipa::path(
    post,
    path = "/api/templates/{id}/clauses",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "Template id")),
    request_body = CreateClauseRequest,
    responses(
        (status = 201, description = "Clause created", body = Clause),
        (status = 400, description = "Invalid request", body = crate::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::ErrorResponse)
    )
)]
pub async fn create_clause(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreateClauseRequest>,
) -> Result<HttpResponse, EngineError> {
    let clause = state
        .templates
        .create_clause(&path, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(clause))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/document-types")
            .route(web::get().to(list_document_types))
            .route(web::post().to(create_document_type)),
    )
    .service(
        web::resource("/document-types/{id}/templates").route(web::get().to(list_templates_by_type)),
    )
    .service(
        web::resource("/templates/default/{category}").route(web::get().to(get_default_template)),
    )
    .service(web::resource("/templates/by-name/{name}").route(web::get().to(get_template_by_name)))
    .service(
        web::resource("/templates/by-name/{name}/ensure").route(web::post().to(ensure_template)),
    )
    .service(
        web::resource("/templates")
            .route(web::get().to(list_templates))
            .route(web::post().to(create_template)),
    )
    .service(web::resource("/templates/{id}").route(web::get().to(get_template)))
    .service(
        web::resource("/templates/{id}/clauses")
            .route(web::get().to(list_clauses))
            .route(web::post().to(create_clause)),
    );
}
