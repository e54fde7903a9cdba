use super::{draw_signatures, Layout, LayoutInput};
use crate::render::canvas::{line_height, Canvas, RenderState};
use crate::render::text::FontFace;
use crate::render::LayoutKind;

const TITLE_SIZE: f64 = 14.0;
const HEADING_SIZE: f64 = 11.0;
const BODY_SIZE: f64 = 10.0;

/// Full contracts: parties, numbered clauses, two signatures.
pub struct ClauseLayout;

impl ClauseLayout {
    fn lessor_block(input: &LayoutInput<'_>) -> String {
        format!(
            "{}, pessoa jurídica inscrita no CNPJ sob o nº {}, com sede em {}, {}/{}, neste ato representada por {}, doravante denominada LOCADORA.",
            input.var("franchisee_name"),
            input.var("franchisee_cnpj"),
            input.var("franchisee_address"),
            input.var("franchisee_city"),
            input.var("franchisee_state"),
            input.var("franchisee_representative"),
        )
    }

    fn lessee_block(input: &LayoutInput<'_>) -> String {
        format!(
            "{}, inscrito(a) no CPF sob o nº {}, RG nº {}, CNH nº {}, residente em {}, {}/{}, telefone {}, doravante denominado(a) LOCATÁRIO(A).",
            input.var("client_name"),
            input.var("client_cpf"),
            input.var("client_rg"),
            input.var("client_driver_license"),
            input.var("client_address"),
            input.var("client_city"),
            input.var("client_state"),
            input.var("client_phone"),
        )
    }

    fn party(
        canvas: &mut Canvas,
        state: RenderState,
        heading: &str,
        text: &str,
    ) -> RenderState {
        let state = canvas.ensure_space(state, line_height(HEADING_SIZE) + line_height(BODY_SIZE));
        let state = canvas.draw_paragraph(state, heading, FontFace::Bold, HEADING_SIZE);
        let state = canvas.draw_paragraph(state, text, FontFace::Regular, BODY_SIZE);
        state.advance(8.0)
    }
}

impl Layout for ClauseLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::ClauseConcatenation
    }

    fn draw(
        &self,
        input: &LayoutInput<'_>,
        canvas: &mut Canvas,
        state: RenderState,
    ) -> RenderState {
        let mut state = canvas.draw_centered(state, &input.title, FontFace::Bold, TITLE_SIZE);
        let number = input.var("document_number");
        if !number.is_empty() {
            state = canvas.draw_centered(
                state,
                &format!("Nº {number}"),
                FontFace::Regular,
                BODY_SIZE,
            );
        }
        state = state.advance(12.0);

        state = Self::party(canvas, state, "LOCADORA", &Self::lessor_block(input));
        state = Self::party(canvas, state, "LOCATÁRIO(A)", &Self::lessee_block(input));
        state = canvas.draw_paragraph(
            state,
            "As partes acima identificadas têm entre si justo e contratado o presente instrumento, que se regerá pelas cláusulas e condições seguintes.",
            FontFace::Regular,
            BODY_SIZE,
        );
        state = state.advance(10.0);

        for clause in &input.clauses {
            // Heading and first body line stay together.
            state = canvas.ensure_space(state, line_height(HEADING_SIZE) + line_height(BODY_SIZE));
            let heading = if clause.title.trim().is_empty() {
                format!("CLÁUSULA {}", clause.number)
            } else {
                format!("CLÁUSULA {} - {}", clause.number, clause.title.to_uppercase())
            };
            state = canvas.draw_paragraph(state, &heading, FontFace::Bold, HEADING_SIZE);
            state = canvas.draw_paragraph(state, &clause.body, FontFace::Regular, BODY_SIZE);
            state = state.advance(8.0);
        }

        let signers = [
            (input.var("franchisee_name"), "LOCADORA"),
            (input.var("client_name"), "LOCATÁRIO(A)"),
        ];
        draw_signatures(input, canvas, state.advance(12.0), &signers)
    }
}
