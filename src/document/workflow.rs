//! Status Workflow: guarded status changes and correlation with external
//! references (signature requests, rendered file URLs).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::models::{DocumentStatus, GeneratedDocument, StatusPatch};
use crate::db::DocumentStore;
use crate::error::EngineError;

/// Compare-and-set attempts before giving up on a contended row.
const CAS_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct StatusWorkflow {
    store: Arc<dyn DocumentStore>,
}

impl StatusWorkflow {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &Uuid) -> Result<GeneratedDocument, EngineError> {
        self.store
            .find_document(id)
            .await?
            .ok_or_else(|| EngineError::not_found("document", id))
    }

    pub async fn list_by_scope(&self, scope_id: &str) -> Result<Vec<GeneratedDocument>, EngineError> {
        Ok(self.store.list_documents_by_scope(scope_id).await?)
    }

    pub async fn find_by_rental(
        &self,
        template_id: &Uuid,
        rental_id: &str,
    ) -> Result<Option<GeneratedDocument>, EngineError> {
        Ok(self.store.find_document_for_rental(template_id, rental_id).await?)
    }

    /// Moves the document to `next` and merges the non-empty fields of
    /// `patch`. Entering `signed` stamps `signed_at` unless one is given or
    /// already recorded.
    pub async fn update_status(
        &self,
        id: &Uuid,
        next: DocumentStatus,
        mut patch: StatusPatch,
    ) -> Result<GeneratedDocument, EngineError> {
        let mut current = self.get(id).await?;

        for _ in 0..CAS_ATTEMPTS {
            if !current.status.can_transition_to(next) {
                return Err(EngineError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
            if next == DocumentStatus::Signed && patch.signed_at.is_none() && current.signed_at.is_none() {
                patch.signed_at = Some(Utc::now());
            }

            if let Some(updated) = self
                .store
                .update_document_status(id, current.status, next, &patch)
                .await?
            {
                log::info!(
                    "Document {} status {} -> {}",
                    updated.document_number,
                    current.status,
                    updated.status
                );
                return Ok(updated);
            }

            // Changed or removed underneath; re-check against the new state.
            current = self.get(id).await?;
        }

        Err(EngineError::InvalidTransition {
            from: current.status,
            to: next,
        })
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), EngineError> {
        if !self.store.delete_document(id).await? {
            return Err(EngineError::not_found("document", id));
        }
        log::info!("Deleted generated document {}", id);
        Ok(())
    }
}
