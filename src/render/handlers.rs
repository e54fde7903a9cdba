use actix_web::http::header;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::RenderedPdf;
use crate::error::EngineError;
use crate::variables::Variables;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct RenderQuery {
    /// `base64` returns a JSON envelope instead of raw PDF bytes.
    pub format: Option<String>,
}

/// PDF bytes wrapped for JSON clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFile {
    pub filename: String,
    pub mime_type: String,
    pub page_count: usize,
    pub layout: String,
    /// Base64-encoded PDF.
    pub data: String,
}

impl From<RenderedPdf> for RenderedFile {
    fn from(pdf: RenderedPdf) -> Self {
        Self {
            filename: pdf.filename,
            mime_type: "application/pdf".to_string(),
            page_count: pdf.page_count,
            layout: pdf.layout.to_string(),
            data: BASE64.encode(&pdf.bytes),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/templates/{id}/render",
    tag = "Rendering",
    params(
        ("id" = Uuid, Path, description = "Template id"),
        RenderQuery
    ),
    request_body(content = Variables, description = "Resolved placeholder bag"),
    responses(
        (status = 200, description = "Rendered PDF (application/pdf, or JSON with format=base64)", body = RenderedFile),
        (status = 404, description = "Template not found", body = crate::ErrorResponse),
        (status = 422, description = "Unresolved placeholders in strict mode", body = crate::ErrorResponse)
    )
)]
pub async fn render_template(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<RenderQuery>,
    body: web::Json<Variables>,
) -> Result<HttpResponse, EngineError> {
    let template_id = path.into_inner();
    let rendered = state.renderer.render(&template_id, &body).await?;

    if query.format.as_deref() == Some("base64") {
        return Ok(HttpResponse::Ok().json(RenderedFile::from(rendered)));
    }

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", rendered.filename),
        ))
        .body(rendered.bytes))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/templates/{id}/render").route(web::post().to(render_template)),
    );
}
