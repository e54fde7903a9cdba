//! Database module - storage trait, backends and shared application state.
//!
//! - `postgres` - sqlx/Postgres backend used in production
//! - `memory` - in-process backend for tests and local runs
//!
//! Both backends enforce the same unique constraints atomically, so the
//! services above them can treat a constraint violation as the source of
//! truth instead of a prior read.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::document::models::{
    DocumentStatus, GeneratedDocument, NewGeneratedDocument, StatusPatch,
};
use crate::document::{DocumentGenerator, StatusWorkflow};
use crate::render::DocumentRenderer;
use crate::template::models::{
    Clause, DocumentType, NewClause, NewDocumentType, NewTemplate, Template,
};
use crate::template::TemplateStore;
use crate::variables::VariableResolver;

/// One generated document per (template, rental).
pub const TEMPLATE_RENTAL_UNIQUE: &str = "generated_documents_template_rental_key";
pub const DOCUMENT_NUMBER_UNIQUE: &str = "generated_documents_document_number_key";
pub const TEMPLATE_NAME_UNIQUE: &str = "document_templates_name_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    Duplicate { constraint: String },
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_duplicate_of(&self, name: &str) -> bool {
        matches!(self, Self::Duplicate { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                return Self::Duplicate {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

/// Persistence for the four record sets: document types, templates, clauses
/// and generated documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError>;
    async fn find_document_type(&self, id: &Uuid) -> Result<Option<DocumentType>, StoreError>;
    async fn insert_document_type(
        &self,
        new: &NewDocumentType,
    ) -> Result<DocumentType, StoreError>;

    async fn list_templates(&self) -> Result<Vec<Template>, StoreError>;
    async fn list_templates_by_type(&self, type_id: &Uuid) -> Result<Vec<Template>, StoreError>;
    async fn find_default_template(&self, category: &str)
        -> Result<Option<Template>, StoreError>;
    async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError>;
    async fn find_template_by_id(&self, id: &Uuid) -> Result<Option<Template>, StoreError>;
    /// Fails with `Duplicate { TEMPLATE_NAME_UNIQUE }` if the name is taken.
    async fn insert_template(&self, new: &NewTemplate) -> Result<Template, StoreError>;

    /// Clauses ordered by `order_index`.
    async fn list_clauses(&self, template_id: &Uuid) -> Result<Vec<Clause>, StoreError>;
    async fn count_clauses(&self, template_id: &Uuid) -> Result<i64, StoreError>;
    async fn insert_clause(&self, new: &NewClause) -> Result<Clause, StoreError>;

    /// Fails with `Duplicate { TEMPLATE_RENTAL_UNIQUE }` when the pair is
    /// taken, or `Duplicate { DOCUMENT_NUMBER_UNIQUE }` on a number clash.
    async fn insert_document(
        &self,
        new: &NewGeneratedDocument,
    ) -> Result<GeneratedDocument, StoreError>;
    async fn find_document(&self, id: &Uuid) -> Result<Option<GeneratedDocument>, StoreError>;
    async fn find_document_for_rental(
        &self,
        template_id: &Uuid,
        rental_id: &str,
    ) -> Result<Option<GeneratedDocument>, StoreError>;
    async fn list_documents_by_scope(
        &self,
        scope_id: &str,
    ) -> Result<Vec<GeneratedDocument>, StoreError>;
    /// Compare-and-set on `expected`; `None` when the row is gone or its
    /// status changed underneath.
    async fn update_document_status(
        &self,
        id: &Uuid,
        expected: DocumentStatus,
        next: DocumentStatus,
        patch: &StatusPatch,
    ) -> Result<Option<GeneratedDocument>, StoreError>;
    async fn delete_document(&self, id: &Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub templates: TemplateStore,
    pub generator: DocumentGenerator,
    pub workflow: StatusWorkflow,
    pub renderer: DocumentRenderer,
    pub resolver: VariableResolver,
    pub config: EngineConfig,
}

impl AppState {
    /// Connects to Postgres when configured, otherwise runs in memory.
    pub async fn new(config: EngineConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url).await?),
            None => {
                log::warn!("DATABASE_URL not set, using the in-memory document store");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        let templates = TemplateStore::new(store.clone(), config.template_cache_ttl);
        let generator = DocumentGenerator::new(
            store.clone(),
            templates.clone(),
            config.document_expiry_days,
        );
        let workflow = StatusWorkflow::new(store.clone());
        let renderer = DocumentRenderer::new(templates.clone(), config.placeholder_mode);
        let resolver = VariableResolver::new(&config);

        Self {
            store,
            templates,
            generator,
            workflow,
            renderer,
            resolver,
            config,
        }
    }
}
