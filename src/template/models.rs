use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::render::LayoutKind;

/// Groups templates, e.g. `rental` contracts and `annex` documents.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DocumentType {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Template {
    pub id: Uuid,
    pub type_id: Uuid,
    /// Stable lookup key; unique across the store.
    pub name: String,
    pub version: i32,
    pub title: String,
    /// Structured sections, see [`TemplateContent`].
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    /// Placeholder names the template expects.
    pub variables: Vec<String>,
    pub active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Typed view of `content`; unknown or malformed content reads as empty.
    pub fn parsed_content(&self) -> TemplateContent {
        serde_json::from_value(self.content.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateContent {
    pub layout: Option<LayoutKind>,
    pub subtitle: Option<String>,
    pub number_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Clause {
    pub id: Uuid,
    pub template_id: Uuid,
    pub clause_number: i32,
    pub title: String,
    /// Body text with `{{identifier}}` placeholders.
    pub content: String,
    pub order_index: i32,
    pub required: bool,
    pub variables: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A template together with its type and ordered clauses.
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    pub template: Template,
    pub document_type: Option<DocumentType>,
    pub clauses: Vec<Clause>,
}

impl TemplateBundle {
    pub fn category(&self) -> Option<&str> {
        self.document_type.as_ref().map(|t| t.category.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewDocumentType {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub type_id: Uuid,
    pub name: String,
    pub version: i32,
    pub title: String,
    pub content: serde_json::Value,
    pub variables: Vec<String>,
    pub active: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct NewClause {
    pub template_id: Uuid,
    pub clause_number: i32,
    pub title: String,
    pub content: String,
    pub order_index: i32,
    pub required: bool,
    pub variables: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDocumentTypeRequest {
    #[schema(example = "Anexos de Locação")]
    pub name: String,
    #[schema(example = "annex")]
    pub category: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    /// Falls back to the first available document type when omitted.
    pub type_id: Option<Uuid>,
    #[schema(example = "responsibility-term")]
    pub name: String,
    pub version: Option<i32>,
    #[schema(example = "TERMO DE RESPONSABILIDADE")]
    pub title: String,
    #[schema(value_type = Object)]
    pub content: Option<serde_json::Value>,
    pub variables: Option<Vec<String>>,
    pub active: Option<bool>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClauseRequest {
    pub clause_number: i32,
    #[schema(example = "DO OBJETO")]
    pub title: String,
    #[schema(example = "O presente contrato tem por objeto a locação do veículo {{vehicle_model}}.")]
    pub content: String,
    /// Render position; supplied by the caller, never assigned by the store.
    pub order_index: i32,
    pub required: Option<bool>,
    /// Derived from `content` when omitted.
    pub variables: Option<Vec<String>>,
}
