//! Serialises a [`RenderedDocument`] with lopdf.
//!
//! Streams are left uncompressed and no timestamps or ids are written, so
//! the same pages always produce the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

use super::canvas::{DrawOp, Page, PageGeometry, RenderedDocument};
use super::text::{encode_win_ansi, FontFace};
use super::RenderError;

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Coordinates rounded to hundredths of a point.
fn real(value: f64) -> Object {
    Object::from((value * 100.0).round() / 100.0)
}

fn font_dictionary(face: FontFace) -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", name("Font"));
    font.set("Subtype", name("Type1"));
    font.set("BaseFont", name(face.base_font()));
    font.set("Encoding", name("WinAnsiEncoding"));
    font
}

fn page_operations(page: &Page, geometry: &PageGeometry) -> Vec<Operation> {
    let flip = |y: f64| geometry.height - y;
    let mut operations = Vec::new();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                face,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![name(face.resource()), real(*size)],
                ));
                operations.push(Operation::new("Td", vec![real(*x), real(flip(*y))]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule { x1, x2, y, width } => {
                operations.push(Operation::new("w", vec![real(*width)]));
                operations.push(Operation::new("m", vec![real(*x1), real(flip(*y))]));
                operations.push(Operation::new("l", vec![real(*x2), real(flip(*y))]));
                operations.push(Operation::new("S", vec![]));
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                gray,
            } => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new("g", vec![real(*gray)]));
                operations.push(Operation::new(
                    "re",
                    vec![
                        real(*x),
                        real(flip(*y + *height)),
                        real(*width),
                        real(*height),
                    ],
                ));
                operations.push(Operation::new("f", vec![]));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }

    operations
}

pub fn write_pdf(rendered: &RenderedDocument) -> Result<Vec<u8>, RenderError> {
    let geometry = &rendered.geometry;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold] {
        let font_id = doc.add_object(font_dictionary(face));
        fonts.set(face.resource(), Object::Reference(font_id));
    }
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::with_capacity(rendered.pages.len());
    for page in &rendered.pages {
        let content = Content {
            operations: page_operations(page, geometry),
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", name("Page"));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", name("Pages"));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    pages.set("Resources", Object::Reference(resources_id));
    pages.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            real(geometry.width),
            real(geometry.height),
        ]),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", name("Catalog"));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{Canvas, RenderState};

    fn sample() -> RenderedDocument {
        let mut canvas = Canvas::new(PageGeometry::A4);
        let state = canvas.draw_centered(
            RenderState::top(&PageGeometry::A4),
            "RECIBO DE CAUÇÃO",
            FontFace::Bold,
            14.0,
        );
        canvas.draw_rule(state);
        canvas.finish()
    }

    #[test]
    fn test_output_is_a_pdf() {
        let bytes = sample().to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let loaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(sample().to_pdf().unwrap(), sample().to_pdf().unwrap());
    }

    #[test]
    fn test_text_is_drawn_with_both_faces_declared() {
        let bytes = sample().to_pdf().unwrap();
        let contains = |needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
        assert!(contains(b"(RECIBO DE CAU"));
        assert!(contains(b"/Helvetica-Bold"));
        assert!(contains(b"/WinAnsiEncoding"));
    }
}
