//! Page model and the threaded render cursor.
//!
//! Coordinates are in points measured from the top-left corner of the page;
//! the PDF writer flips them. Every drawing helper takes a [`RenderState`]
//! and returns the state after drawing, so pagination is a pure function of
//! the state and the requested height.

use super::pdf;
use super::text::{text_width, wrap_text, FontFace};
use super::RenderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl PageGeometry {
    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
        margin_left: 50.0,
        margin_right: 50.0,
        margin_top: 60.0,
        margin_bottom: 60.0,
    };

    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    /// Lowest y any drawn content may reach.
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin_bottom
    }
}

pub fn line_height(size: f64) -> f64 {
    size * 1.4
}

/// Position of the next draw: vertical cursor and page index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub cursor_y: f64,
    pub page_index: usize,
}

impl RenderState {
    pub fn top(geometry: &PageGeometry) -> Self {
        Self {
            cursor_y: geometry.margin_top,
            page_index: 0,
        }
    }

    /// State from which `needed` points can be drawn without crossing the
    /// bottom limit. Breaks to a fresh page when they do not fit, unless the
    /// cursor already sits at the top of a page (oversized blocks are then
    /// drawn as they are).
    pub fn reserve(self, needed: f64, geometry: &PageGeometry) -> Self {
        let fits = self.cursor_y + needed <= geometry.bottom_limit();
        if fits || self.cursor_y <= geometry.margin_top {
            self
        } else {
            Self {
                cursor_y: geometry.margin_top,
                page_index: self.page_index + 1,
            }
        }
    }

    pub fn advance(self, amount: f64) -> Self {
        Self {
            cursor_y: self.cursor_y + amount,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline.
    Text {
        x: f64,
        y: f64,
        size: f64,
        face: FontFace,
        text: String,
    },
    Rule {
        x1: f64,
        x2: f64,
        y: f64,
        width: f64,
    },
    /// `y` is the top edge; `gray` is 0 (black) to 1 (white).
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        gray: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Horizontal placement of a text line within the content area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

pub struct Canvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn push(&mut self, page_index: usize, op: DrawOp) {
        while self.pages.len() <= page_index {
            self.pages.push(Page::default());
        }
        self.pages[page_index].ops.push(op);
    }

    pub fn ensure_space(&mut self, state: RenderState, needed: f64) -> RenderState {
        let next = state.reserve(needed, &self.geometry);
        if next.page_index != state.page_index {
            log::debug!("Page break before page {}", next.page_index + 1);
            while self.pages.len() <= next.page_index {
                self.pages.push(Page::default());
            }
        }
        next
    }

    /// Draws one line at `x`, breaking the page first if it does not fit.
    pub fn draw_line_at(
        &mut self,
        state: RenderState,
        x: f64,
        text: &str,
        face: FontFace,
        size: f64,
    ) -> RenderState {
        let state = self.ensure_space(state, line_height(size));
        if !text.is_empty() {
            self.push(
                state.page_index,
                DrawOp::Text {
                    x,
                    y: state.cursor_y + size,
                    size,
                    face,
                    text: text.to_string(),
                },
            );
        }
        state.advance(line_height(size))
    }

    pub fn draw_lines(
        &mut self,
        mut state: RenderState,
        lines: &[String],
        face: FontFace,
        size: f64,
        align: Align,
    ) -> RenderState {
        for line in lines {
            let x = match align {
                Align::Left => self.geometry.margin_left,
                Align::Center => {
                    let free = self.geometry.content_width() - text_width(line, face, size);
                    self.geometry.margin_left + (free / 2.0).max(0.0)
                }
            };
            state = self.draw_line_at(state, x, line, face, size);
        }
        state
    }

    /// Wrapped, left-aligned paragraph across the content width.
    pub fn draw_paragraph(
        &mut self,
        state: RenderState,
        text: &str,
        face: FontFace,
        size: f64,
    ) -> RenderState {
        let lines = wrap_text(text, face, size, self.geometry.content_width());
        self.draw_lines(state, &lines, face, size, Align::Left)
    }

    pub fn draw_centered(
        &mut self,
        state: RenderState,
        text: &str,
        face: FontFace,
        size: f64,
    ) -> RenderState {
        let lines = wrap_text(text, face, size, self.geometry.content_width());
        self.draw_lines(state, &lines, face, size, Align::Center)
    }

    /// Full-width horizontal rule with a little space around it.
    pub fn draw_rule(&mut self, state: RenderState) -> RenderState {
        let state = self.ensure_space(state, 12.0);
        self.push(
            state.page_index,
            DrawOp::Rule {
                x1: self.geometry.margin_left,
                x2: self.geometry.width - self.geometry.margin_right,
                y: state.cursor_y + 6.0,
                width: 0.8,
            },
        );
        state.advance(12.0)
    }

    pub fn finish(self) -> RenderedDocument {
        RenderedDocument {
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}

/// Laid-out pages, independent of the output format.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Drawn text in reading order, one line per text op.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|page| page.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_pdf(&self) -> Result<Vec<u8>, RenderError> {
        pdf::write_pdf(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_keeps_state_when_block_fits() {
        let geometry = PageGeometry::A4;
        let state = RenderState {
            cursor_y: 500.0,
            page_index: 0,
        };
        assert_eq!(state.reserve(100.0, &geometry), state);
    }

    #[test]
    fn test_reserve_breaks_page_at_bottom_limit() {
        let geometry = PageGeometry::A4;
        let state = RenderState {
            cursor_y: geometry.bottom_limit() - 10.0,
            page_index: 2,
        };
        let next = state.reserve(14.0, &geometry);
        assert_eq!(next.page_index, 3);
        assert_eq!(next.cursor_y, geometry.margin_top);
    }

    #[test]
    fn test_oversized_block_at_top_does_not_loop() {
        let geometry = PageGeometry::A4;
        let state = RenderState::top(&geometry);
        assert_eq!(state.reserve(10_000.0, &geometry), state);
    }

    #[test]
    fn test_lines_never_cross_bottom_limit() {
        let mut canvas = Canvas::new(PageGeometry::A4);
        let lines: Vec<String> = (0..120).map(|i| format!("linha {i}")).collect();
        let state = canvas.draw_lines(
            RenderState::top(&PageGeometry::A4),
            &lines,
            FontFace::Regular,
            10.0,
            Align::Left,
        );
        let doc = canvas.finish();

        assert!(doc.page_count() > 1);
        assert_eq!(state.page_index + 1, doc.page_count());
        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y <= doc.geometry.bottom_limit());
                    assert!(*y > doc.geometry.margin_top);
                }
            }
        }
        assert_eq!(doc.text().lines().count(), 120);
    }

    #[test]
    fn test_centered_line_is_centered() {
        let mut canvas = Canvas::new(PageGeometry::A4);
        canvas.draw_centered(
            RenderState::top(&PageGeometry::A4),
            "TÍTULO",
            FontFace::Bold,
            14.0,
        );
        let doc = canvas.finish();
        let DrawOp::Text { x, text, .. } = &doc.pages[0].ops[0] else {
            panic!("expected a text op");
        };
        let width = text_width(text, FontFace::Bold, 14.0);
        let left = x - doc.geometry.margin_left;
        let right = doc.geometry.width - doc.geometry.margin_right - (x + width);
        assert!((left - right).abs() < 1e-6);
    }
}
