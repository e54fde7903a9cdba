mod common;

#[cfg(test)]
mod workflow_tests {
    use super::common::{maria_silva, seeded_state, template_id};
    use rental_docs_server::document::models::{
        DocumentStatus, GenerateDocumentRequest, GeneratedDocument, StatusPatch,
    };
    use rental_docs_server::error::EngineError;
    use rental_docs_server::AppState;
    use uuid::Uuid;

    async fn draft(state: &AppState, rental_id: &str) -> GeneratedDocument {
        let term = template_id(state, "responsibility-term").await;
        state
            .generator
            .generate(GenerateDocumentRequest {
                template_id: term,
                variables: maria_silva(),
                scope_id: "franchise-salvador-01".to_string(),
                rental_id: Some(rental_id.to_string()),
                created_by: None,
                number_prefix: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_to_signed() {
        let state = seeded_state().await;
        let doc = draft(&state, "42").await;

        let generated = state
            .workflow
            .update_status(
                &doc.id,
                DocumentStatus::Generated,
                StatusPatch {
                    rendered_url: Some("https://files.example.com/termo-42.pdf".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(generated.status, DocumentStatus::Generated);
        assert_eq!(
            generated.rendered_url.as_deref(),
            Some("https://files.example.com/termo-42.pdf")
        );

        let sent = state
            .workflow
            .update_status(
                &doc.id,
                DocumentStatus::Sent,
                StatusPatch {
                    external_signature_ref: Some("sig-req-9001".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(sent.external_signature_ref.as_deref(), Some("sig-req-9001"));
        // Earlier fields are kept when the patch leaves them out.
        assert!(sent.rendered_url.is_some());
        assert!(sent.signed_at.is_none());

        let signed = state
            .workflow
            .update_status(&doc.id, DocumentStatus::Signed, StatusPatch::default())
            .await
            .unwrap();
        assert_eq!(signed.status, DocumentStatus::Signed);
        assert!(signed.signed_at.is_some());
        assert_eq!(signed.document_number, doc.document_number);
    }

    #[tokio::test]
    async fn test_illegal_transitions_are_rejected() {
        let state = seeded_state().await;
        let doc = draft(&state, "42").await;

        match state
            .workflow
            .update_status(&doc.id, DocumentStatus::Signed, StatusPatch::default())
            .await
        {
            Err(EngineError::InvalidTransition { from, to }) => {
                assert_eq!(from, DocumentStatus::Draft);
                assert_eq!(to, DocumentStatus::Signed);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }

        let unchanged = state.workflow.get(&doc.id).await.unwrap();
        assert_eq!(unchanged.status, DocumentStatus::Draft);
    }

    #[tokio::test]
    async fn test_cancelled_is_terminal() {
        let state = seeded_state().await;
        let doc = draft(&state, "42").await;

        state
            .workflow
            .update_status(&doc.id, DocumentStatus::Cancelled, StatusPatch::default())
            .await
            .unwrap();

        for next in [
            DocumentStatus::Draft,
            DocumentStatus::Generated,
            DocumentStatus::Sent,
            DocumentStatus::Signed,
        ] {
            assert!(matches!(
                state
                    .workflow
                    .update_status(&doc.id, next, StatusPatch::default())
                    .await,
                Err(EngineError::InvalidTransition { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_same_status_attaches_late_reference() {
        let state = seeded_state().await;
        let doc = draft(&state, "42").await;
        state
            .workflow
            .update_status(&doc.id, DocumentStatus::Sent, StatusPatch::default())
            .await
            .unwrap();

        let updated = state
            .workflow
            .update_status(
                &doc.id,
                DocumentStatus::Sent,
                StatusPatch {
                    external_signature_ref: Some("sig-late".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, DocumentStatus::Sent);
        assert_eq!(updated.external_signature_ref.as_deref(), Some("sig-late"));
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let state = seeded_state().await;
        let missing = Uuid::new_v4();

        assert!(matches!(
            state
                .workflow
                .update_status(&missing, DocumentStatus::Sent, StatusPatch::default())
                .await,
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            state.workflow.delete(&missing).await,
            Err(EngineError::NotFound { .. })
        ));
    }
}
