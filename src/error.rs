//! Error taxonomy exposed at the engine boundary.
//!
//! Storage and rendering have their own error types; everything that leaves a
//! service is folded into [`EngineError`], which also knows how to present
//! itself as an HTTP response.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::db::StoreError;
use crate::document::models::DocumentStatus;
use crate::render::RenderError;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The (template, rental) pair already has a generated document.
    #[error("a document already exists for this template and rental (number {document_number})")]
    AlreadyExists { document_number: String },

    #[error("status transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("unresolved placeholders: {}", .0.join(", "))]
    UnresolvedVariable(Vec<String>),

    #[error("{0}")]
    Validation(String),

    #[error("no document type found in the system")]
    NoDocumentType,

    /// Storage or network failure; retrying is up to the caller.
    #[error("storage failure: {0}")]
    TransientFailure(#[source] StoreError),

    #[error("failed to render document: {0}")]
    Render(#[source] RenderError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable kind used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::UnresolvedVariable(_) => "UnresolvedVariable",
            Self::Validation(_) => "BadRequest",
            Self::NoDocumentType => "NoDocumentType",
            Self::TransientFailure(_) => "TransientFailure",
            Self::Render(_) => "InternalServerError",
            Self::Configuration(_) => "ConfigurationError",
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::TransientFailure(err)
    }
}

impl From<RenderError> for EngineError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnresolvedVariables(names) => Self::UnresolvedVariable(names),
            other => Self::Render(other),
        }
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists { .. } | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::UnresolvedVariable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NoDocumentType => StatusCode::PRECONDITION_FAILED,
            Self::TransientFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Render(_) | Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(
            self,
            Self::TransientFailure(_) | Self::Render(_) | Self::Configuration(_)
        ) {
            log::error!("{}", self);
        }

        let mut body = ErrorResponse::new(self.kind(), &self.to_string());
        if let Self::AlreadyExists { document_number } = self {
            body.document_number = Some(document_number.clone());
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
