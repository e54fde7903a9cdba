mod common;

#[cfg(test)]
mod generation_tests {
    use super::common::{maria_silva, seeded_state, template_id};
    use async_trait::async_trait;
    use rental_docs_server::config::EngineConfig;
    use rental_docs_server::db::{
        AppState, DocumentStore, MemoryStore, StoreError, TEMPLATE_RENTAL_UNIQUE,
    };
    use rental_docs_server::document::models::{
        DocumentStatus, GenerateDocumentRequest, GeneratedDocument, NewGeneratedDocument,
        StatusPatch,
    };
    use rental_docs_server::error::EngineError;
    use rental_docs_server::template::models::{
        Clause, DocumentType, NewClause, NewDocumentType, NewTemplate, Template,
    };
    use rental_docs_server::template::seed_catalog;
    use std::collections::HashSet;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Memory store whose (template, rental) winner is always gone by the
    /// time the generator looks it up.
    struct VanishingWinnerStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl DocumentStore for VanishingWinnerStore {
        async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError> {
            self.inner.list_document_types().await
        }

        async fn find_document_type(&self, id: &Uuid) -> Result<Option<DocumentType>, StoreError> {
            self.inner.find_document_type(id).await
        }

        async fn insert_document_type(
            &self,
            new: &NewDocumentType,
        ) -> Result<DocumentType, StoreError> {
            self.inner.insert_document_type(new).await
        }

        async fn list_templates(&self) -> Result<Vec<Template>, StoreError> {
            self.inner.list_templates().await
        }

        async fn list_templates_by_type(&self, type_id: &Uuid) -> Result<Vec<Template>, StoreError> {
            self.inner.list_templates_by_type(type_id).await
        }

        async fn find_default_template(
            &self,
            category: &str,
        ) -> Result<Option<Template>, StoreError> {
            self.inner.find_default_template(category).await
        }

        async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
            self.inner.find_template_by_name(name).await
        }

        async fn find_template_by_id(&self, id: &Uuid) -> Result<Option<Template>, StoreError> {
            self.inner.find_template_by_id(id).await
        }

        async fn insert_template(&self, new: &NewTemplate) -> Result<Template, StoreError> {
            self.inner.insert_template(new).await
        }

        async fn list_clauses(&self, template_id: &Uuid) -> Result<Vec<Clause>, StoreError> {
            self.inner.list_clauses(template_id).await
        }

        async fn count_clauses(&self, template_id: &Uuid) -> Result<i64, StoreError> {
            self.inner.count_clauses(template_id).await
        }

        async fn insert_clause(&self, new: &NewClause) -> Result<Clause, StoreError> {
            self.inner.insert_clause(new).await
        }

        async fn insert_document(
            &self,
            _new: &NewGeneratedDocument,
        ) -> Result<GeneratedDocument, StoreError> {
            Err(StoreError::Duplicate {
                constraint: TEMPLATE_RENTAL_UNIQUE.to_string(),
            })
        }

        async fn find_document(&self, id: &Uuid) -> Result<Option<GeneratedDocument>, StoreError> {
            self.inner.find_document(id).await
        }

        async fn find_document_for_rental(
            &self,
            _template_id: &Uuid,
            _rental_id: &str,
        ) -> Result<Option<GeneratedDocument>, StoreError> {
            Ok(None)
        }

        async fn list_documents_by_scope(
            &self,
            scope_id: &str,
        ) -> Result<Vec<GeneratedDocument>, StoreError> {
            self.inner.list_documents_by_scope(scope_id).await
        }

        async fn update_document_status(
            &self,
            id: &Uuid,
            expected: DocumentStatus,
            next: DocumentStatus,
            patch: &StatusPatch,
        ) -> Result<Option<GeneratedDocument>, StoreError> {
            self.inner
                .update_document_status(id, expected, next, patch)
                .await
        }

        async fn delete_document(&self, id: &Uuid) -> Result<bool, StoreError> {
            self.inner.delete_document(id).await
        }
    }

    fn request(template_id: Uuid, rental_id: Option<&str>) -> GenerateDocumentRequest {
        GenerateDocumentRequest {
            template_id,
            variables: maria_silva(),
            scope_id: "franchise-salvador-01".to_string(),
            rental_id: rental_id.map(str::to_string),
            created_by: Some("operator-7".to_string()),
            number_prefix: None,
        }
    }

    #[tokio::test]
    async fn test_second_generation_for_same_rental_is_rejected() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let first = state.generator.generate(request(term, Some("42"))).await.unwrap();
        assert_eq!(first.status, DocumentStatus::Draft);
        assert!(first.document_number.starts_with("TERMO-"));

        match state.generator.generate(request(term, Some("42"))).await {
            Err(EngineError::AlreadyExists { document_number }) => {
                assert_eq!(document_number, first.document_number)
            }
            other => panic!("expected AlreadyExists, got {other:?}"),
        }

        let stored = state.workflow.get(&first.id).await.unwrap();
        assert_eq!(stored.document_number, first.document_number);
    }

    #[tokio::test]
    async fn test_regenerate_after_delete_gets_new_number() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let first = state.generator.generate(request(term, Some("42"))).await.unwrap();
        state.workflow.delete(&first.id).await.unwrap();

        let second = state.generator.generate(request(term, Some("42"))).await.unwrap();
        assert_ne!(second.id, first.id);
        assert_ne!(second.document_number, first.document_number);
    }

    #[tokio::test]
    async fn test_concurrent_generation_yields_exactly_one_document() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = state.generator.clone();
                let req = request(term, Some("rental-77"));
                tokio::spawn(async move { generator.generate(req).await })
            })
            .collect();

        let mut winners = Vec::new();
        let mut rejected_numbers = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(document) => winners.push(document),
                Err(EngineError::AlreadyExists { document_number }) => {
                    rejected_numbers.push(document_number)
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(rejected_numbers.len(), 7);
        assert!(rejected_numbers
            .iter()
            .all(|n| *n == winners[0].document_number));
    }

    #[tokio::test]
    async fn test_documents_without_rental_are_not_deduplicated() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let a = state.generator.generate(request(term, None)).await.unwrap();
        let b = state.generator.generate(request(term, Some("   "))).await.unwrap();
        assert!(a.rental_id.is_none());
        assert!(b.rental_id.is_none());
        assert_ne!(a.document_number, b.document_number);
    }

    #[tokio::test]
    async fn test_same_rental_on_other_template_is_allowed() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;
        let receipt = template_id(&state, "deposit-receipt").await;

        state.generator.generate(request(term, Some("42"))).await.unwrap();
        let other = state.generator.generate(request(receipt, Some("42"))).await.unwrap();
        assert!(other.document_number.starts_with("RECIBO-"));
    }

    #[tokio::test]
    async fn test_numbers_are_unique_across_many_generations() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let mut numbers = HashSet::new();
        for i in 0..25 {
            let rental = format!("r-{i}");
            let doc = state
                .generator
                .generate(request(term, Some(&rental)))
                .await
                .unwrap();
            assert!(numbers.insert(doc.document_number));
        }
    }

    #[tokio::test]
    async fn test_request_prefix_and_derived_words() {
        let state = seeded_state().await;
        let contract = template_id(&state, "rental-contract").await;

        let mut req = request(contract, Some("9"));
        req.number_prefix = Some("locacao".to_string());
        req.variables.insert("weekly_amount", 650.0);
        let doc = state.generator.generate(req).await.unwrap();

        assert!(doc.document_number.starts_with("LOCACAO-"));
        assert_eq!(
            doc.resolved_data.text_or("weekly_amount_words", ""),
            "seiscentos e cinquenta reais"
        );
        assert_eq!(
            doc.resolved_data.text_or("document_number", ""),
            doc.document_number
        );
        assert!(doc.expires_at > doc.created_at);
    }

    #[tokio::test]
    async fn test_exhausted_retries_name_the_rental_constraint() {
        let store = VanishingWinnerStore {
            inner: MemoryStore::new(),
        };
        let state = AppState::with_store(Arc::new(store), EngineConfig::default());
        seed_catalog(&state.templates).await.unwrap();
        let term = template_id(&state, "responsibility-term").await;

        match state.generator.generate(request(term, Some("42"))).await {
            Err(EngineError::TransientFailure(StoreError::Duplicate { constraint })) => {
                assert_eq!(constraint, TEMPLATE_RENTAL_UNIQUE)
            }
            other => panic!("expected TransientFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_an_error() {
        let config = EngineConfig {
            document_expiry_days: 1_000_000_000,
            ..EngineConfig::default()
        };
        let state = AppState::with_store(Arc::new(MemoryStore::new()), config);
        seed_catalog(&state.templates).await.unwrap();
        let term = template_id(&state, "responsibility-term").await;

        assert!(matches!(
            state.generator.generate(request(term, Some("42"))).await,
            Err(EngineError::Configuration(_))
        ));
        assert!(state
            .workflow
            .find_by_rental(&term, "42")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_generation_validates_input() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let mut blank_scope = request(term, Some("1"));
        blank_scope.scope_id = "  ".to_string();
        assert!(matches!(
            state.generator.generate(blank_scope).await,
            Err(EngineError::Validation(_))
        ));

        assert!(matches!(
            state.generator.generate(request(Uuid::new_v4(), Some("1"))).await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_scope_listing_and_rental_lookup() {
        let state = seeded_state().await;
        let term = template_id(&state, "responsibility-term").await;

        let doc = state.generator.generate(request(term, Some("42"))).await.unwrap();
        let mut elsewhere = request(term, Some("43"));
        elsewhere.scope_id = "franchise-feira-02".to_string();
        state.generator.generate(elsewhere).await.unwrap();

        let listed = state
            .workflow
            .list_by_scope("franchise-salvador-01")
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, doc.id);

        let found = state.workflow.find_by_rental(&term, "42").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(doc.id));
        assert!(state
            .workflow
            .find_by_rental(&term, "99")
            .await
            .unwrap()
            .is_none());
    }
}
