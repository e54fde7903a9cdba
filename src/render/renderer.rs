use std::collections::BTreeSet;

use uuid::Uuid;

use super::canvas::{Canvas, PageGeometry, RenderState, RenderedDocument};
use super::layouts::{layout_for, LayoutInput, ResolvedClause};
use super::placeholder::substitute;
use super::{LayoutKind, PlaceholderMode, RenderError};
use crate::error::EngineError;
use crate::metrics;
use crate::template::models::TemplateBundle;
use crate::template::TemplateStore;
use crate::variables::Variables;

/// Result of rendering a template.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub layout: LayoutKind,
}

/// Lays out `bundle` with `vars` substituted into it.
///
/// Identical input always yields identical pages. In strict mode any
/// placeholder or declared variable without a value fails the render
/// with the sorted list of missing identifiers.
pub fn compose(
    bundle: &TemplateBundle,
    vars: &Variables,
    mode: PlaceholderMode,
) -> Result<RenderedDocument, RenderError> {
    let kind = LayoutKind::select(bundle);
    let content = bundle.template.parsed_content();
    let mut unresolved = BTreeSet::new();
    let mut resolve = |text: &str| {
        let result = substitute(text, vars);
        unresolved.extend(result.unresolved);
        result.text
    };

    let title = resolve(&bundle.template.title);
    let subtitle = content.subtitle.as_deref().map(&mut resolve);
    // The tariff schedule does not draw clauses.
    let clauses = if kind == LayoutKind::TariffTable {
        Vec::new()
    } else {
        bundle
            .clauses
            .iter()
            .map(|clause| ResolvedClause {
                number: clause.clause_number,
                title: resolve(&clause.title),
                body: resolve(&clause.content),
            })
            .collect()
    };

    if mode == PlaceholderMode::Strict {
        unresolved.extend(
            bundle
                .template
                .variables
                .iter()
                .filter(|name| !vars.contains(name))
                .cloned(),
        );
    }

    if !unresolved.is_empty() {
        let names: Vec<String> = unresolved.into_iter().collect();
        match mode {
            PlaceholderMode::Strict => return Err(RenderError::UnresolvedVariables(names)),
            PlaceholderMode::Lenient => log::warn!(
                "Rendering template '{}' with unresolved placeholders: {}",
                bundle.template.name,
                names.join(", ")
            ),
        }
    }

    let input = LayoutInput {
        title,
        subtitle,
        clauses,
        vars,
    };
    let geometry = PageGeometry::A4;
    let mut canvas = Canvas::new(geometry);
    layout_for(kind).draw(&input, &mut canvas, RenderState::top(&geometry));
    Ok(canvas.finish())
}

#[derive(Clone)]
pub struct DocumentRenderer {
    templates: TemplateStore,
    mode: PlaceholderMode,
}

impl DocumentRenderer {
    pub fn new(templates: TemplateStore, mode: PlaceholderMode) -> Self {
        Self { templates, mode }
    }

    pub async fn render(
        &self,
        template_id: &Uuid,
        vars: &Variables,
    ) -> Result<RenderedPdf, EngineError> {
        let bundle = self.templates.bundle(template_id).await?;
        let layout = LayoutKind::select(&bundle);
        let document = compose(&bundle, vars, self.mode)?;
        let bytes = document.to_pdf()?;

        metrics::record_render(layout.as_str());
        log::info!(
            "Rendered template '{}' ({}): {} page(s), {} bytes",
            bundle.template.name,
            layout,
            document.page_count(),
            bytes.len()
        );

        let number = vars.text_or("document_number", "preview");
        let filename = sanitize_filename::sanitize(format!("{}-{}.pdf", bundle.template.name, number));
        Ok(RenderedPdf {
            filename,
            bytes,
            page_count: document.page_count(),
            layout,
        })
    }
}
