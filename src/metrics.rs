//! Engine counters, exposed on `/metrics/engine` next to the HTTP metrics
//! served by the middleware on `/metrics`.

use actix_web::{web, HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
    static ref DOCUMENTS_GENERATED: Option<IntCounter> = register(IntCounter::new(
        "documents_generated_total",
        "Generated document records persisted"
    ));
    static ref DOCUMENTS_REJECTED_DUPLICATE: Option<IntCounter> = register(IntCounter::new(
        "documents_rejected_duplicate_total",
        "Generation requests rejected because the template/rental pair already has a document"
    ));
    static ref RENDERS: Option<IntCounterVec> = register(IntCounterVec::new(
        Opts::new("renders_total", "Rendered PDF documents by layout"),
        &["layout"]
    ));
}

/// Registers `collector`; a metric that cannot be built is logged and
/// left out instead of taking the engine down.
fn register<C>(collector: prometheus::Result<C>) -> Option<C>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    let collector = match collector {
        Ok(collector) => collector,
        Err(e) => {
            log::error!("Invalid metric definition: {}", e);
            return None;
        }
    };
    if let Err(e) = REGISTRY.register(Box::new(collector.clone())) {
        log::warn!("Failed to register metric: {}", e);
    }
    Some(collector)
}

pub fn record_generated() {
    if let Some(counter) = DOCUMENTS_GENERATED.as_ref() {
        counter.inc();
    }
}

pub fn record_rejected_duplicate() {
    if let Some(counter) = DOCUMENTS_REJECTED_DUPLICATE.as_ref() {
        counter.inc();
    }
}

pub fn record_render(layout: &str) {
    if let Some(counter) = RENDERS.as_ref() {
        counter.with_label_values(&[layout]).inc();
    }
}

pub async fn engine_metrics() -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&REGISTRY.gather(), &mut buffer) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/metrics/engine").route(web::get().to(engine_metrics)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_gathered() {
        record_render("simple-document");
        record_generated();
        record_rejected_duplicate();

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&REGISTRY.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("renders_total{layout=\"simple-document\"}"));
        assert!(text.contains("documents_generated_total"));
        assert!(text.contains("documents_rejected_duplicate_total"));
    }

    #[test]
    fn test_invalid_definition_is_skipped() {
        let invalid = register(IntCounter::new("", "metric without a name"));
        assert!(invalid.is_none());

        let bad_label = register(IntCounterVec::new(
            Opts::new("bad_label_total", "label names must be identifiers"),
            &["not a label"],
        ));
        assert!(bad_label.is_none());
    }
}
