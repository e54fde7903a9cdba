//! Template Store: document types, templates and clauses, with a read cache
//! of assembled [`TemplateBundle`]s.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::{
    Clause, CreateClauseRequest, CreateDocumentTypeRequest, CreateTemplateRequest, DocumentType,
    NewClause, NewDocumentType, NewTemplate, Template, TemplateBundle,
};
use super::seed::{self, CatalogEntry};
use crate::db::{DocumentStore, TEMPLATE_NAME_UNIQUE};
use crate::error::EngineError;
use crate::render::placeholder::identifiers;
use crate::validation::{
    validate_identifiers, validate_non_negative, validate_required, ValidationErrors,
};

/// What [`TemplateStore::provision`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provision {
    Existing,
    Created,
    Repaired,
}

#[derive(Clone)]
pub struct TemplateStore {
    store: Arc<dyn DocumentStore>,
    cache: Cache<Uuid, Arc<TemplateBundle>>,
    /// Serialises creation and repair within this process.
    provisioning: Arc<Mutex<()>>,
}

impl TemplateStore {
    pub fn new(store: Arc<dyn DocumentStore>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(cache_ttl)
            .build();
        Self {
            store,
            cache,
            provisioning: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list_document_types(&self) -> Result<Vec<DocumentType>, EngineError> {
        Ok(self.store.list_document_types().await?)
    }

    pub async fn create_document_type(
        &self,
        request: CreateDocumentTypeRequest,
    ) -> Result<DocumentType, EngineError> {
        let mut errors = ValidationErrors::new();
        validate_required(&request.name, "name", "Name", &mut errors);
        validate_required(&request.category, "category", "Category", &mut errors);
        errors.into_result()?;

        let created = self
            .store
            .insert_document_type(&NewDocumentType {
                name: request.name.trim().to_string(),
                category: request.category.trim().to_string(),
            })
            .await?;
        log::info!("Created document type '{}' ({})", created.name, created.category);
        Ok(created)
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>, EngineError> {
        Ok(self.store.list_templates().await?)
    }

    pub async fn list_templates_by_type(&self, type_id: &Uuid) -> Result<Vec<Template>, EngineError> {
        if self.store.find_document_type(type_id).await?.is_none() {
            return Err(EngineError::not_found("document type", type_id));
        }
        Ok(self.store.list_templates_by_type(type_id).await?)
    }

    pub async fn get_default_template(&self, category: &str) -> Result<Template, EngineError> {
        self.store
            .find_default_template(category)
            .await?
            .ok_or_else(|| EngineError::not_found("default template for category", category))
    }

    pub async fn get_template_by_name(&self, name: &str) -> Result<Template, EngineError> {
        self.store
            .find_template_by_name(name)
            .await?
            .ok_or_else(|| EngineError::not_found("template", name))
    }

    pub async fn get_template_by_id(&self, id: &Uuid) -> Result<Template, EngineError> {
        self.store
            .find_template_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("template", id))
    }

    /// Clauses in render order.
    pub async fn list_clauses(&self, template_id: &Uuid) -> Result<Vec<Clause>, EngineError> {
        self.get_template_by_id(template_id).await?;
        Ok(self.store.list_clauses(template_id).await?)
    }

    pub async fn create_template(
        &self,
        request: CreateTemplateRequest,
    ) -> Result<Template, EngineError> {
        let variables = request.variables.unwrap_or_default();
        let version = request.version.unwrap_or(1);

        let mut errors = ValidationErrors::new();
        validate_required(&request.name, "name", "Name", &mut errors);
        validate_required(&request.title, "title", "Title", &mut errors);
        validate_identifiers(&variables, "variables", &mut errors);
        validate_non_negative(version, "version", &mut errors);
        errors.into_result()?;

        let type_id = match request.type_id {
            Some(id) => {
                self.store
                    .find_document_type(&id)
                    .await?
                    .ok_or_else(|| EngineError::not_found("document type", id))?
                    .id
            }
            None => self.first_document_type().await?.id,
        };

        let new = NewTemplate {
            type_id,
            name: request.name.trim().to_string(),
            version,
            title: request.title,
            content: request.content.unwrap_or_else(|| serde_json::json!({})),
            variables,
            active: request.active.unwrap_or(true),
            is_default: request.is_default.unwrap_or(false),
        };
        match self.store.insert_template(&new).await {
            Ok(template) => {
                log::info!("Created template '{}' v{}", template.name, template.version);
                Ok(template)
            }
            Err(e) if e.is_duplicate_of(TEMPLATE_NAME_UNIQUE) => Err(EngineError::Validation(
                format!("template name '{}' is already taken", new.name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Adds a clause at the caller's `order_index`; ordering is neither
    /// assigned nor checked here.
    pub async fn create_clause(
        &self,
        template_id: &Uuid,
        request: CreateClauseRequest,
    ) -> Result<Clause, EngineError> {
        let mut errors = ValidationErrors::new();
        validate_required(&request.content, "content", "Content", &mut errors);
        validate_non_negative(request.clause_number, "clause_number", &mut errors);
        if let Some(variables) = &request.variables {
            validate_identifiers(variables, "variables", &mut errors);
        }
        errors.into_result()?;

        let template = self.get_template_by_id(template_id).await?;
        let variables = request
            .variables
            .unwrap_or_else(|| identifiers(&request.content));

        let undeclared: Vec<String> = identifiers(&request.content)
            .into_iter()
            .filter(|name| !template.variables.contains(name))
            .collect();
        if !undeclared.is_empty() {
            log::warn!(
                "Clause for template '{}' uses placeholders not declared by the template: {}",
                template.name,
                undeclared.join(", ")
            );
        }

        let clause = self
            .store
            .insert_clause(&NewClause {
                template_id: template.id,
                clause_number: request.clause_number,
                title: request.title,
                content: request.content,
                order_index: request.order_index,
                required: request.required.unwrap_or(true),
                variables,
            })
            .await?;
        self.cache.invalidate(&template.id).await;
        Ok(clause)
    }

    /// Template, type and ordered clauses, cached by template id.
    pub async fn bundle(&self, template_id: &Uuid) -> Result<Arc<TemplateBundle>, EngineError> {
        if let Some(bundle) = self.cache.get(template_id).await {
            return Ok(bundle);
        }

        let template = self.get_template_by_id(template_id).await?;
        let document_type = self.store.find_document_type(&template.type_id).await?;
        let clauses = self.store.list_clauses(template_id).await?;
        let bundle = Arc::new(TemplateBundle {
            template,
            document_type,
            clauses,
        });
        self.cache.insert(*template_id, bundle.clone()).await;
        Ok(bundle)
    }

    /// Id of the template called `name`, creating it (or restoring its
    /// clauses) from the canonical catalog when needed. Names outside the
    /// catalog are only looked up.
    pub async fn get_or_create_by_name(&self, name: &str) -> Result<Uuid, EngineError> {
        match seed::find(name) {
            Some(entry) => Ok(self.provision(entry).await?.0),
            None => Ok(self.get_template_by_name(name).await?.id),
        }
    }

    pub(crate) async fn provision(
        &self,
        entry: &CatalogEntry,
    ) -> Result<(Uuid, Provision), EngineError> {
        let _guard = self.provisioning.lock().await;

        if let Some(existing) = self.store.find_template_by_name(entry.name).await? {
            let repaired = self.repair(&existing, entry).await?;
            let outcome = if repaired {
                Provision::Repaired
            } else {
                Provision::Existing
            };
            return Ok((existing.id, outcome));
        }

        let type_id = self.type_for(entry).await?;
        let template = match self.store.insert_template(&entry.new_template(type_id)).await {
            Ok(template) => template,
            Err(e) if e.is_duplicate_of(TEMPLATE_NAME_UNIQUE) => {
                // Another process created it first.
                let winner = self
                    .store
                    .find_template_by_name(entry.name)
                    .await?
                    .ok_or_else(|| EngineError::not_found("template", entry.name))?;
                log::info!("Template '{}' was created concurrently, reusing it", entry.name);
                return Ok((winner.id, Provision::Existing));
            }
            Err(e) => return Err(e.into()),
        };

        for clause in entry.new_clauses(template.id) {
            self.store.insert_clause(&clause).await?;
        }
        log::info!(
            "Created template '{}' with {} clause(s)",
            entry.name,
            entry.clauses.len()
        );
        Ok((template.id, Provision::Created))
    }

    /// Restores catalog clauses of a template that has none.
    async fn repair(&self, template: &Template, entry: &CatalogEntry) -> Result<bool, EngineError> {
        if entry.clauses.is_empty() || self.store.count_clauses(&template.id).await? > 0 {
            return Ok(false);
        }

        log::warn!(
            "Template '{}' has no clauses, restoring {} from the catalog",
            template.name,
            entry.clauses.len()
        );
        for clause in entry.new_clauses(template.id) {
            self.store.insert_clause(&clause).await?;
        }
        self.cache.invalidate(&template.id).await;
        Ok(true)
    }

    async fn type_for(&self, entry: &CatalogEntry) -> Result<Uuid, EngineError> {
        let types = self.store.list_document_types().await?;
        if let Some(existing) = types
            .iter()
            .find(|t| t.category == entry.document_type.category)
        {
            return Ok(existing.id);
        }
        let created = self
            .store
            .insert_document_type(&NewDocumentType {
                name: entry.document_type.name.to_string(),
                category: entry.document_type.category.to_string(),
            })
            .await?;
        Ok(created.id)
    }

    async fn first_document_type(&self) -> Result<DocumentType, EngineError> {
        self.store
            .list_document_types()
            .await?
            .into_iter()
            .next()
            .ok_or(EngineError::NoDocumentType)
    }
}
