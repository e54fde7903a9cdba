#![allow(dead_code)]

use std::sync::Arc;

use rental_docs_server::config::EngineConfig;
use rental_docs_server::db::{AppState, MemoryStore};
use rental_docs_server::template::seed_catalog;
use rental_docs_server::variables::Variables;
use uuid::Uuid;

/// Fresh in-memory state with an empty store.
pub fn memory_state() -> AppState {
    AppState::with_store(Arc::new(MemoryStore::new()), EngineConfig::default())
}

/// In-memory state with the canonical catalog seeded.
pub async fn seeded_state() -> AppState {
    let state = memory_state();
    seed_catalog(&state.templates)
        .await
        .expect("catalog seeding should succeed");
    state
}

pub async fn template_id(state: &AppState, name: &str) -> Uuid {
    state
        .templates
        .get_template_by_name(name)
        .await
        .expect("template should exist")
        .id
}

/// The four values the responsibility term needs.
pub fn maria_silva() -> Variables {
    [
        ("client_name", "Maria Silva"),
        ("client_cpf", "123.456.789-00"),
        ("contract_city", "Salvador"),
        ("contract_date", "01/01/2025"),
    ]
    .into_iter()
    .collect()
}
