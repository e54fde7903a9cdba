//! Display numbers for generated documents: `<PREFIX>-<YEAR>-<EPOCH_MILLIS>`.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, Utc};

pub const FALLBACK_PREFIX: &str = "DOC";

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Epoch milliseconds, strictly increasing within the process.
fn next_millis(now: DateTime<Utc>) -> i64 {
    let now_ms = now.timestamp_millis();
    let previous = LAST_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_ms.max(last + 1))
        })
        .unwrap_or(now_ms);
    now_ms.max(previous + 1)
}

/// Uppercase ASCII letters and digits only; falls back to `DOC`.
pub fn normalize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        cleaned
    }
}

/// Prefix used when neither the request nor the template names one.
pub fn category_prefix(category: Option<&str>) -> &'static str {
    match category {
        Some("rental") => "CONTRATO",
        Some("annex") => "ANEXO",
        _ => FALLBACK_PREFIX,
    }
}

pub fn document_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        normalize_prefix(prefix),
        now.year(),
        next_millis(now)
    )
}
