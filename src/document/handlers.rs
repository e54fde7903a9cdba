use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::models::{
    DocumentListQuery, GenerateDocumentRequest, GeneratedDocument, UpdateStatusRequest,
};
use crate::error::EngineError;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body = GenerateDocumentRequest,
    responses(
        (status = 201, description = "Draft document record created", body = GeneratedDocument),
        (status = 404, description = "Template not found", body = crate::ErrorResponse),
        (status = 409, description = "Template/rental pair already has a document", body = crate::ErrorResponse)
    )
)]
pub async fn generate_document(
    state: web::Data<AppState>,
    body: web::Json<GenerateDocumentRequest>,
) -> Result<HttpResponse, EngineError> {
    let document = state.generator.generate(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(document))
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "Documents of the scope, newest first", body = Vec<GeneratedDocument>)
    )
)]
pub async fn list_documents(
    state: web::Data<AppState>,
    query: web::Query<DocumentListQuery>,
) -> Result<HttpResponse, EngineError> {
    let documents = state.workflow.list_by_scope(&query.scope_id).await?;
    Ok(HttpResponse::Ok().json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document found", body = GeneratedDocument),
        (status = 404, description = "Document not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_document(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, EngineError> {
    let document = state.workflow.get(&path).await?;
    Ok(HttpResponse::Ok().json(document))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = crate::ErrorResponse)
    )
)]
pub async fn delete_document(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, EngineError> {
    state.workflow.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}/status",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = GeneratedDocument),
        (status = 404, description = "Document not found", body = crate::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::ErrorResponse)
    )
)]
pub async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, EngineError> {
    let UpdateStatusRequest { status, patch } = body.into_inner();
    let document = state.workflow.update_status(&path, status, patch).await?;
    Ok(HttpResponse::Ok().json(document))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/documents")
            .route(web::get().to(list_documents))
            .route(web::post().to(generate_document)),
    )
    .service(
        web::resource("/documents/{id}")
            .route(web::get().to(get_document))
            .route(web::delete().to(delete_document)),
    )
    .service(web::resource("/documents/{id}/status").route(web::put().to(update_status)));
}
