//! In-process backend.
//!
//! A single mutex guards all tables, so each operation (including the
//! uniqueness checks in the inserts) is atomic, mirroring the constraints
//! declared in the Postgres migration.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{
    DocumentStore, StoreError, DOCUMENT_NUMBER_UNIQUE, TEMPLATE_NAME_UNIQUE,
    TEMPLATE_RENTAL_UNIQUE,
};
use crate::document::models::{
    DocumentStatus, GeneratedDocument, NewGeneratedDocument, StatusPatch,
};
use crate::template::models::{
    Clause, DocumentType, NewClause, NewDocumentType, NewTemplate, Template,
};

#[derive(Default)]
struct Tables {
    document_types: Vec<DocumentType>,
    templates: Vec<Template>,
    clauses: Vec<Clause>,
    documents: Vec<GeneratedDocument>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .document_types
            .iter()
            .filter(|t| t.active)
            .cloned()
            .collect())
    }

    async fn find_document_type(&self, id: &Uuid) -> Result<Option<DocumentType>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables.document_types.iter().find(|t| t.id == *id).cloned())
    }

    async fn insert_document_type(
        &self,
        new: &NewDocumentType,
    ) -> Result<DocumentType, StoreError> {
        let created = DocumentType {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            category: new.category.clone(),
            active: true,
            created_at: Utc::now(),
        };
        self.tables.lock().document_types.push(created.clone());
        Ok(created)
    }

    async fn list_templates(&self) -> Result<Vec<Template>, StoreError> {
        let tables = self.tables.lock();
        let mut templates = tables.templates.clone();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn list_templates_by_type(&self, type_id: &Uuid) -> Result<Vec<Template>, StoreError> {
        let tables = self.tables.lock();
        let mut templates: Vec<Template> = tables
            .templates
            .iter()
            .filter(|t| t.type_id == *type_id && t.active)
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn find_default_template(
        &self,
        category: &str,
    ) -> Result<Option<Template>, StoreError> {
        let tables = self.tables.lock();
        let type_ids: Vec<Uuid> = tables
            .document_types
            .iter()
            .filter(|t| t.active && t.category == category)
            .map(|t| t.id)
            .collect();
        Ok(tables
            .templates
            .iter()
            .filter(|t| t.active && t.is_default && type_ids.contains(&t.type_id))
            .max_by_key(|t| t.version)
            .cloned())
    }

    async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables.templates.iter().find(|t| t.name == name).cloned())
    }

    async fn find_template_by_id(&self, id: &Uuid) -> Result<Option<Template>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables.templates.iter().find(|t| t.id == *id).cloned())
    }

    async fn insert_template(&self, new: &NewTemplate) -> Result<Template, StoreError> {
        let mut tables = self.tables.lock();
        if tables.templates.iter().any(|t| t.name == new.name) {
            return Err(StoreError::Duplicate {
                constraint: TEMPLATE_NAME_UNIQUE.to_string(),
            });
        }
        let now = Utc::now();
        let created = Template {
            id: Uuid::new_v4(),
            type_id: new.type_id,
            name: new.name.clone(),
            version: new.version,
            title: new.title.clone(),
            content: new.content.clone(),
            variables: new.variables.clone(),
            active: new.active,
            is_default: new.is_default,
            created_at: now,
            updated_at: now,
        };
        tables.templates.push(created.clone());
        Ok(created)
    }

    async fn list_clauses(&self, template_id: &Uuid) -> Result<Vec<Clause>, StoreError> {
        let tables = self.tables.lock();
        let mut clauses: Vec<Clause> = tables
            .clauses
            .iter()
            .filter(|c| c.template_id == *template_id)
            .cloned()
            .collect();
        clauses.sort_by_key(|c| (c.order_index, c.clause_number));
        Ok(clauses)
    }

    async fn count_clauses(&self, template_id: &Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .clauses
            .iter()
            .filter(|c| c.template_id == *template_id)
            .count() as i64)
    }

    async fn insert_clause(&self, new: &NewClause) -> Result<Clause, StoreError> {
        let created = Clause {
            id: Uuid::new_v4(),
            template_id: new.template_id,
            clause_number: new.clause_number,
            title: new.title.clone(),
            content: new.content.clone(),
            order_index: new.order_index,
            required: new.required,
            variables: new.variables.clone(),
            created_at: Utc::now(),
        };
        self.tables.lock().clauses.push(created.clone());
        Ok(created)
    }

    async fn insert_document(
        &self,
        new: &NewGeneratedDocument,
    ) -> Result<GeneratedDocument, StoreError> {
        let mut tables = self.tables.lock();

        if let Some(rental_id) = &new.rental_id {
            let taken = tables.documents.iter().any(|d| {
                d.template_id == new.template_id && d.rental_id.as_deref() == Some(rental_id)
            });
            if taken {
                return Err(StoreError::Duplicate {
                    constraint: TEMPLATE_RENTAL_UNIQUE.to_string(),
                });
            }
        }
        if tables
            .documents
            .iter()
            .any(|d| d.document_number == new.document_number)
        {
            return Err(StoreError::Duplicate {
                constraint: DOCUMENT_NUMBER_UNIQUE.to_string(),
            });
        }

        let now = Utc::now();
        let created = GeneratedDocument {
            id: Uuid::new_v4(),
            template_id: new.template_id,
            rental_id: new.rental_id.clone(),
            document_number: new.document_number.clone(),
            resolved_data: new.resolved_data.clone(),
            rendered_url: None,
            status: new.status,
            external_signature_ref: None,
            signed_at: None,
            expires_at: new.expires_at,
            scope_id: new.scope_id.clone(),
            created_by: new.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.documents.push(created.clone());
        Ok(created)
    }

    async fn find_document(&self, id: &Uuid) -> Result<Option<GeneratedDocument>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables.documents.iter().find(|d| d.id == *id).cloned())
    }

    async fn find_document_for_rental(
        &self,
        template_id: &Uuid,
        rental_id: &str,
    ) -> Result<Option<GeneratedDocument>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .documents
            .iter()
            .find(|d| d.template_id == *template_id && d.rental_id.as_deref() == Some(rental_id))
            .cloned())
    }

    async fn list_documents_by_scope(
        &self,
        scope_id: &str,
    ) -> Result<Vec<GeneratedDocument>, StoreError> {
        let tables = self.tables.lock();
        let mut documents: Vec<GeneratedDocument> = tables
            .documents
            .iter()
            .filter(|d| d.scope_id == scope_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn update_document_status(
        &self,
        id: &Uuid,
        expected: DocumentStatus,
        next: DocumentStatus,
        patch: &StatusPatch,
    ) -> Result<Option<GeneratedDocument>, StoreError> {
        let mut tables = self.tables.lock();
        let Some(document) = tables
            .documents
            .iter_mut()
            .find(|d| d.id == *id && d.status == expected)
        else {
            return Ok(None);
        };

        document.status = next;
        if let Some(reference) = &patch.external_signature_ref {
            document.external_signature_ref = Some(reference.clone());
        }
        if let Some(url) = &patch.rendered_url {
            document.rendered_url = Some(url.clone());
        }
        if let Some(signed_at) = patch.signed_at {
            document.signed_at = Some(signed_at);
        }
        document.updated_at = Utc::now();
        Ok(Some(document.clone()))
    }

    async fn delete_document(&self, id: &Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock();
        let before = tables.documents.len();
        tables.documents.retain(|d| d.id != *id);
        Ok(tables.documents.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::Variables;

    fn new_document(template_id: Uuid, rental: Option<&str>, number: &str) -> NewGeneratedDocument {
        NewGeneratedDocument {
            template_id,
            rental_id: rental.map(str::to_string),
            document_number: number.to_string(),
            resolved_data: Variables::new(),
            status: DocumentStatus::Draft,
            expires_at: Utc::now(),
            scope_id: "scope".to_string(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_template_rental_pair_is_unique() {
        let store = MemoryStore::new();
        let template_id = Uuid::new_v4();
        store
            .insert_document(&new_document(template_id, Some("42"), "A-1"))
            .await
            .unwrap();

        let err = store
            .insert_document(&new_document(template_id, Some("42"), "A-2"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(TEMPLATE_RENTAL_UNIQUE));

        // Other rentals and documents without a rental are unconstrained.
        store
            .insert_document(&new_document(template_id, Some("43"), "A-3"))
            .await
            .unwrap();
        store
            .insert_document(&new_document(template_id, None, "A-4"))
            .await
            .unwrap();
        store
            .insert_document(&new_document(template_id, None, "A-5"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_document_number_is_unique() {
        let store = MemoryStore::new();
        store
            .insert_document(&new_document(Uuid::new_v4(), None, "A-1"))
            .await
            .unwrap();
        let err = store
            .insert_document(&new_document(Uuid::new_v4(), None, "A-1"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(DOCUMENT_NUMBER_UNIQUE));
    }

    #[tokio::test]
    async fn test_status_update_is_compare_and_set() {
        let store = MemoryStore::new();
        let doc = store
            .insert_document(&new_document(Uuid::new_v4(), None, "A-1"))
            .await
            .unwrap();

        let stale = store
            .update_document_status(
                &doc.id,
                DocumentStatus::Sent,
                DocumentStatus::Signed,
                &StatusPatch::default(),
            )
            .await
            .unwrap();
        assert!(stale.is_none());

        let patch = StatusPatch {
            rendered_url: Some("https://files.example.com/a-1.pdf".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_document_status(&doc.id, DocumentStatus::Draft, DocumentStatus::Generated, &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, DocumentStatus::Generated);
        assert_eq!(updated.rendered_url, patch.rendered_url);
        assert!(updated.external_signature_ref.is_none());
    }
}
