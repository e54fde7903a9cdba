//! PDF Renderer - template + clauses + variable bag in, paginated PDF out.
//!
//! - `placeholder` - `{{identifier}}` substitution
//! - `text` - font metrics, wrapping, WinAnsi encoding
//! - `canvas` - page model and the threaded [`RenderState`]
//! - `layouts` - clause-concatenation, simple-document and tariff-table
//! - `pdf` - lopdf serialisation
//!
//! [`compose`] is synchronous and free of I/O; [`DocumentRenderer`] adds the
//! template lookup, metrics and byte serialisation on top.

pub mod canvas;
pub mod handlers;
pub mod layouts;
pub mod pdf;
pub mod placeholder;
mod renderer;
pub mod text;

pub use canvas::{PageGeometry, RenderState, RenderedDocument};
pub use renderer::{compose, DocumentRenderer, RenderedPdf};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::models::TemplateBundle;

/// Template name that always renders as the tariff schedule.
pub const TARIFF_TEMPLATE_NAME: &str = "tariff-schedule";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unresolved placeholders: {}", .0.join(", "))]
    UnresolvedVariables(Vec<String>),
    #[error("failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// What to do with placeholders that have no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderMode {
    /// Refuse to render.
    #[default]
    Strict,
    /// Leave the literal token in the output and log a warning.
    Lenient,
}

impl FromStr for PlaceholderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown placeholder mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    ClauseConcatenation,
    SimpleDocument,
    TariffTable,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClauseConcatenation => "clause-concatenation",
            Self::SimpleDocument => "simple-document",
            Self::TariffTable => "tariff-table",
        }
    }

    /// Explicit `layout` in the template content wins; then the tariff
    /// schedule by name; annexes render as simple documents; everything
    /// else as a full contract.
    pub fn select(bundle: &TemplateBundle) -> Self {
        if let Some(kind) = bundle.template.parsed_content().layout {
            return kind;
        }
        if bundle.template.name == TARIFF_TEMPLATE_NAME {
            return Self::TariffTable;
        }
        match bundle.category() {
            Some("annex") => Self::SimpleDocument,
            _ => Self::ClauseConcatenation,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
