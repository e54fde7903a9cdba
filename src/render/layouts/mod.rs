//! Layout strategies. Each one draws a fully substituted document onto a
//! [`Canvas`] starting from a [`RenderState`] and returns the final state.

mod clauses;
mod simple;
mod tariff;

pub use clauses::ClauseLayout;
pub use simple::SimpleLayout;
pub use tariff::{TariffLayout, TARIFF_ROWS};

use super::canvas::{line_height, Canvas, DrawOp, RenderState};
use super::text::FontFace;
use super::LayoutKind;
use crate::variables::Variables;

/// A clause after placeholder substitution.
#[derive(Debug, Clone)]
pub struct ResolvedClause {
    pub number: i32,
    pub title: String,
    pub body: String,
}

pub struct LayoutInput<'a> {
    pub title: String,
    pub subtitle: Option<String>,
    pub clauses: Vec<ResolvedClause>,
    pub vars: &'a Variables,
}

impl LayoutInput<'_> {
    pub fn var(&self, key: &str) -> String {
        self.vars.text_or(key, "")
    }
}

pub trait Layout: Sync {
    fn kind(&self) -> LayoutKind;

    fn draw(&self, input: &LayoutInput<'_>, canvas: &mut Canvas, state: RenderState)
        -> RenderState;
}

pub fn layout_for(kind: LayoutKind) -> &'static dyn Layout {
    match kind {
        LayoutKind::ClauseConcatenation => &ClauseLayout,
        LayoutKind::SimpleDocument => &SimpleLayout,
        LayoutKind::TariffTable => &TariffLayout,
    }
}

/// `"{city}, {date}."` line closing the signed layouts.
fn date_line(input: &LayoutInput<'_>) -> String {
    let date = input
        .vars
        .get("contract_date_long")
        .or_else(|| input.vars.get("contract_date"))
        .map(|v| v.to_string())
        .unwrap_or_default();
    format!("{}, {}.", input.var("contract_city"), date)
}

const SIGNATURE_WIDTH: f64 = 220.0;
const SIGNATURE_GAP: f64 = 36.0;

/// Height taken by [`draw_signatures`].
fn signature_block_height() -> f64 {
    line_height(10.0) + SIGNATURE_GAP + 2.0 * line_height(9.0)
}

/// Date line followed by one signature line per `(name, role)`, side by
/// side. The block is never split across pages.
fn draw_signatures(
    input: &LayoutInput<'_>,
    canvas: &mut Canvas,
    state: RenderState,
    signers: &[(String, &str)],
) -> RenderState {
    let state = canvas.ensure_space(state, signature_block_height());
    let state = canvas.draw_paragraph(state, &date_line(input), FontFace::Regular, 10.0);
    let line_y = state.cursor_y + SIGNATURE_GAP;

    let geometry = *canvas.geometry();
    let slot = geometry.content_width() / signers.len().max(1) as f64;
    for (i, (signer, role)) in signers.iter().enumerate() {
        let x1 = geometry.margin_left + slot * i as f64 + (slot - SIGNATURE_WIDTH).max(0.0) / 2.0;
        let x2 = x1 + SIGNATURE_WIDTH.min(slot);
        canvas.push(
            state.page_index,
            DrawOp::Rule {
                x1,
                x2,
                y: line_y,
                width: 0.6,
            },
        );
        for (row, label) in [signer.as_str(), *role].into_iter().enumerate() {
            canvas.push(
                state.page_index,
                DrawOp::Text {
                    x: x1,
                    y: line_y + 2.0 + 9.0 + row as f64 * line_height(9.0),
                    size: 9.0,
                    face: FontFace::Regular,
                    text: label.to_string(),
                },
            );
        }
    }

    state.advance(SIGNATURE_GAP + 2.0 * line_height(9.0))
}
