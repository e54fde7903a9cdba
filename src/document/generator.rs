//! Document Generator: one persisted record per generation call, at most one
//! per (template, rental).
//!
//! The (template, rental) check is a fast path only. The storage constraint
//! decides: a violation on insert is reported as `AlreadyExists` carrying
//! the number of the document that won.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use super::models::{DocumentStatus, GenerateDocumentRequest, GeneratedDocument, NewGeneratedDocument};
use super::numbering::{category_prefix, document_number};
use crate::db::{DocumentStore, StoreError, DOCUMENT_NUMBER_UNIQUE, TEMPLATE_RENTAL_UNIQUE};
use crate::error::EngineError;
use crate::metrics;
use crate::template::models::TemplateBundle;
use crate::template::TemplateStore;
use crate::validation::{validate_required, ValidationErrors};
use crate::variables::words::amount_in_words;
use crate::variables::Variables;

const NUMBER_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct DocumentGenerator {
    store: Arc<dyn DocumentStore>,
    templates: TemplateStore,
    expiry_days: i64,
}

impl DocumentGenerator {
    pub fn new(store: Arc<dyn DocumentStore>, templates: TemplateStore, expiry_days: i64) -> Self {
        Self {
            store,
            templates,
            expiry_days,
        }
    }

    fn expires_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, EngineError> {
        TimeDelta::try_days(self.expiry_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "document expiry of {} days is out of range",
                    self.expiry_days
                ))
            })
    }

    pub async fn generate(
        &self,
        request: GenerateDocumentRequest,
    ) -> Result<GeneratedDocument, EngineError> {
        let mut errors = ValidationErrors::new();
        validate_required(&request.scope_id, "scope_id", "Scope", &mut errors);
        errors.into_result()?;

        let bundle = self.templates.bundle(&request.template_id).await?;
        let rental_id = request
            .rental_id
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if let Some(rental_id) = &rental_id {
            if let Some(existing) = self
                .store
                .find_document_for_rental(&request.template_id, rental_id)
                .await?
            {
                return Err(reject_duplicate(existing));
            }
        }

        let mut data = with_amounts_in_words(request.variables);
        let prefix = number_prefix(request.number_prefix.as_deref(), &bundle);
        let mut last_conflict = DOCUMENT_NUMBER_UNIQUE;

        for attempt in 1..=NUMBER_ATTEMPTS {
            let now = Utc::now();
            let expires_at = self.expires_at(now)?;
            let number = document_number(&prefix, now);
            data.insert("document_number", number.clone());

            let new = NewGeneratedDocument {
                template_id: request.template_id,
                rental_id: rental_id.clone(),
                document_number: number,
                resolved_data: data.clone(),
                status: DocumentStatus::Draft,
                expires_at,
                scope_id: request.scope_id.trim().to_string(),
                created_by: request.created_by.clone(),
            };

            match self.store.insert_document(&new).await {
                Ok(document) => {
                    metrics::record_generated();
                    log::info!(
                        "Generated document {} from template '{}' (rental {})",
                        document.document_number,
                        bundle.template.name,
                        document.rental_id.as_deref().unwrap_or("-")
                    );
                    return Ok(document);
                }
                Err(e) if e.is_duplicate_of(TEMPLATE_RENTAL_UNIQUE) => {
                    let rental = rental_id.as_deref().unwrap_or_default();
                    match self
                        .store
                        .find_document_for_rental(&request.template_id, rental)
                        .await?
                    {
                        Some(existing) => return Err(reject_duplicate(existing)),
                        // Winner was deleted in the meantime; try again.
                        None => last_conflict = TEMPLATE_RENTAL_UNIQUE,
                    }
                }
                Err(e) if e.is_duplicate_of(DOCUMENT_NUMBER_UNIQUE) => {
                    last_conflict = DOCUMENT_NUMBER_UNIQUE;
                    log::warn!(
                        "Document number {} already taken (attempt {}/{})",
                        new.document_number,
                        attempt,
                        NUMBER_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::TransientFailure(StoreError::Duplicate {
            constraint: last_conflict.to_string(),
        }))
    }
}

fn reject_duplicate(existing: GeneratedDocument) -> EngineError {
    metrics::record_rejected_duplicate();
    log::info!(
        "Rejected generation: rental {} already has document {}",
        existing.rental_id.as_deref().unwrap_or("-"),
        existing.document_number
    );
    EngineError::AlreadyExists {
        document_number: existing.document_number,
    }
}

/// Request prefix, else the template's `number_prefix`, else the category
/// default.
fn number_prefix(requested: Option<&str>, bundle: &TemplateBundle) -> String {
    requested
        .filter(|p| !p.trim().is_empty())
        .map(str::to_string)
        .or_else(|| bundle.template.parsed_content().number_prefix)
        .unwrap_or_else(|| category_prefix(bundle.category()).to_string())
}

/// Adds `<key>_words` for every numeric `*_amount` value that lacks one.
fn with_amounts_in_words(mut data: Variables) -> Variables {
    let derived: Vec<(String, String)> = data
        .iter()
        .filter(|(key, _)| key.ends_with("_amount"))
        .filter_map(|(key, value)| {
            let words_key = format!("{key}_words");
            let amount = value.as_number()?;
            (!data.contains(&words_key)).then(|| (words_key, amount_in_words(amount)))
        })
        .collect();
    for (key, words) in derived {
        data.insert(key, words);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_words_are_derived_for_numbers_only() {
        let mut data = Variables::new();
        data.insert("weekly_amount", 650.0);
        data.insert("deposit_amount", "R$ 1.500,00");
        data.insert("fine_amount", 10.0);
        data.insert("fine_amount_words", "dez reais (fixo)");

        let data = with_amounts_in_words(data);
        assert_eq!(data.text_or("weekly_amount_words", "?"), "seiscentos e cinquenta reais");
        assert!(!data.contains("deposit_amount_words"));
        assert_eq!(data.text_or("fine_amount_words", "?"), "dez reais (fixo)");
    }
}
