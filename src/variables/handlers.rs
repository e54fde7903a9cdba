use actix_web::{web, HttpResponse, Responder};

use super::resolver::RentalContext;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/variables/resolve",
    tag = "Variables",
    request_body = RentalContext,
    responses(
        (status = 200, description = "Resolved placeholder bag as a flat JSON object")
    )
)]
pub async fn resolve_variables(
    state: web::Data<AppState>,
    body: web::Json<RentalContext>,
) -> impl Responder {
    let variables = state.resolver.resolve(&body);
    HttpResponse::Ok().json(variables)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/variables/resolve").route(web::post().to(resolve_variables)));
}
