mod common;

#[cfg(test)]
mod template_store_tests {
    use super::common::{memory_state, seeded_state};
    use rental_docs_server::error::EngineError;
    use rental_docs_server::template::models::{
        CreateClauseRequest, CreateDocumentTypeRequest, CreateTemplateRequest,
    };
    use rental_docs_server::template::seed::{self, CATALOG};
    use rental_docs_server::template::seed_catalog;

    fn template_request(name: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            type_id: None,
            name: name.to_string(),
            version: None,
            title: "TERMO DE VISTORIA".to_string(),
            content: None,
            variables: Some(vec!["vehicle_plate".to_string()]),
            active: None,
            is_default: None,
        }
    }

    fn clause_request(order_index: i32, content: &str) -> CreateClauseRequest {
        CreateClauseRequest {
            clause_number: order_index + 1,
            title: "Da vistoria".to_string(),
            content: content.to_string(),
            order_index,
            required: None,
            variables: None,
        }
    }

    async fn annex_type(state: &rental_docs_server::AppState) {
        state
            .templates
            .create_document_type(CreateDocumentTypeRequest {
                name: "Anexos de Locação".to_string(),
                category: "annex".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let state = seeded_state().await;
        let templates = state.templates.list_templates().await.unwrap();
        assert_eq!(templates.len(), CATALOG.len());
        let types = state.templates.list_document_types().await.unwrap();

        seed_catalog(&state.templates).await.unwrap();
        assert_eq!(state.templates.list_templates().await.unwrap().len(), CATALOG.len());
        assert_eq!(state.templates.list_document_types().await.unwrap().len(), types.len());

        let contract = state.templates.get_template_by_name("rental-contract").await.unwrap();
        let clauses = state.templates.list_clauses(&contract.id).await.unwrap();
        assert_eq!(clauses.len(), seed::find("rental-contract").unwrap().clauses.len());
    }

    #[tokio::test]
    async fn test_defaults_by_category() {
        let state = seeded_state().await;
        let rental = state.templates.get_default_template("rental").await.unwrap();
        assert_eq!(rental.name, "rental-contract");
        assert!(matches!(
            state.templates.get_default_template("insurance").await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_or_create_provisions_catalog_templates_once() {
        let state = memory_state();

        let first = state
            .templates
            .get_or_create_by_name("deposit-receipt")
            .await
            .unwrap();
        let second = state
            .templates
            .get_or_create_by_name("deposit-receipt")
            .await
            .unwrap();
        assert_eq!(first, second);

        let clauses = state.templates.list_clauses(&first).await.unwrap();
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].content.contains("{{deposit_amount}}"));
        assert_eq!(state.templates.list_templates().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_returns_one_template() {
        let state = memory_state();
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let templates = state.templates.clone();
                tokio::spawn(async move { templates.get_or_create_by_name("power-of-attorney").await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(state.templates.list_templates().await.unwrap().len(), 1);
        assert_eq!(state.templates.list_clauses(&ids[0]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_template_without_clauses_is_repaired_from_catalog() {
        let state = memory_state();
        annex_type(&state).await;

        let mut request = template_request("monitoring-declaration");
        request.title = "DECLARAÇÃO DE MONITORAMENTO".to_string();
        let bare = state.templates.create_template(request).await.unwrap();
        assert!(state.templates.list_clauses(&bare.id).await.unwrap().is_empty());

        let id = state
            .templates
            .get_or_create_by_name("monitoring-declaration")
            .await
            .unwrap();
        assert_eq!(id, bare.id);
        let clauses = state.templates.list_clauses(&id).await.unwrap();
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].content.contains("rastreamento"));
    }

    #[tokio::test]
    async fn test_unknown_names_are_not_created() {
        let state = seeded_state().await;
        assert!(matches!(
            state.templates.get_or_create_by_name("lease-extension").await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_template_needs_a_document_type() {
        let state = memory_state();
        assert!(matches!(
            state.templates.create_template(template_request("vistoria")).await,
            Err(EngineError::NoDocumentType)
        ));

        annex_type(&state).await;
        let created = state
            .templates
            .create_template(template_request("vistoria"))
            .await
            .unwrap();
        assert_eq!(created.version, 1);
        assert!(created.active);
        assert!(!created.is_default);
    }

    #[tokio::test]
    async fn test_duplicate_template_name_is_rejected() {
        let state = seeded_state().await;
        assert!(matches!(
            state
                .templates
                .create_template(template_request("rental-contract"))
                .await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_requests_collect_errors() {
        let state = seeded_state().await;

        let mut request = template_request("  ");
        request.title = String::new();
        request.variables = Some(vec!["client name".to_string()]);
        match state.templates.create_template(request).await {
            Err(EngineError::Validation(message)) => {
                assert!(message.contains("name"));
                assert!(message.contains("title"));
                assert!(message.contains("variables"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let result = state
            .templates
            .create_document_type(CreateDocumentTypeRequest {
                name: String::new(),
                category: "annex".to_string(),
            })
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_new_clause_is_visible_through_the_cache() {
        let state = memory_state();
        annex_type(&state).await;
        let template = state
            .templates
            .create_template(template_request("vistoria"))
            .await
            .unwrap();

        let empty = state.templates.bundle(&template.id).await.unwrap();
        assert!(empty.clauses.is_empty());

        let clause = state
            .templates
            .create_clause(&template.id, clause_request(0, "Veículo placa {{vehicle_plate}}."))
            .await
            .unwrap();
        assert_eq!(clause.variables, vec!["vehicle_plate"]);

        let bundle = state.templates.bundle(&template.id).await.unwrap();
        assert_eq!(bundle.clauses.len(), 1);
        assert_eq!(bundle.category(), Some("annex"));
    }

    #[tokio::test]
    async fn test_clauses_are_listed_by_order_index() {
        let state = memory_state();
        annex_type(&state).await;
        let template = state
            .templates
            .create_template(template_request("vistoria"))
            .await
            .unwrap();

        for index in [2, 0, 1] {
            state
                .templates
                .create_clause(&template.id, clause_request(index, &format!("Item {index}")))
                .await
                .unwrap();
        }

        let clauses = state.templates.list_clauses(&template.id).await.unwrap();
        let order: Vec<i32> = clauses.iter().map(|c| c.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_templates_by_type() {
        let state = seeded_state().await;
        let types = state.templates.list_document_types().await.unwrap();
        let annex = types.iter().find(|t| t.category == "annex").unwrap();

        let annexes = state.templates.list_templates_by_type(&annex.id).await.unwrap();
        assert!(annexes.iter().any(|t| t.name == "tariff-schedule"));
        assert!(annexes.iter().all(|t| t.type_id == annex.id));

        assert!(matches!(
            state
                .templates
                .list_templates_by_type(&uuid::Uuid::new_v4())
                .await,
            Err(EngineError::NotFound { .. })
        ));
    }
}
