use super::{Layout, LayoutInput};
use crate::render::canvas::{Canvas, RenderState};
use crate::render::text::FontFace;
use crate::render::LayoutKind;

/// Short annexes: title, rule, clause bodies. Signature lines come from the
/// clause text itself.
pub struct SimpleLayout;

impl Layout for SimpleLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::SimpleDocument
    }

    fn draw(
        &self,
        input: &LayoutInput<'_>,
        canvas: &mut Canvas,
        state: RenderState,
    ) -> RenderState {
        let state = canvas.draw_centered(state, &input.title, FontFace::Bold, 14.0);
        let mut state = canvas.draw_rule(state.advance(4.0)).advance(10.0);

        for clause in &input.clauses {
            state = canvas.draw_paragraph(state, &clause.body, FontFace::Regular, 11.0);
            state = state.advance(10.0);
        }
        state
    }
}
