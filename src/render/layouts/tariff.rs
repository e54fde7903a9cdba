//! Fixed-price schedule annex.
//!
//! Apart from the title, subtitle and the identification paragraph, the
//! wording and the price list are fixed here and do not come from the
//! template or its clauses.

use super::{draw_signatures, Layout, LayoutInput};
use crate::render::canvas::{line_height, Canvas, DrawOp, RenderState};
use crate::render::text::{wrap_text, FontFace};
use crate::render::LayoutKind;

pub const DEFAULT_SUBTITLE: &str = "Tabela de Preços de Serviços e Avarias";

/// `(service, price)` rows of the schedule.
pub const TARIFF_ROWS: &[(&str, &str)] = &[
    ("Lavagem simples", "R$ 50,00"),
    ("Lavagem completa com higienização interna", "R$ 150,00"),
    ("Taxa de reabastecimento (além do combustível)", "R$ 50,00"),
    ("Perda ou extravio da chave", "R$ 500,00"),
    ("Perda do documento do veículo (CRLV)", "R$ 250,00"),
    ("Reparo de pneu furado", "R$ 60,00"),
    ("Pneu avariado (por unidade)", "R$ 400,00"),
    ("Retrovisor quebrado (por unidade)", "R$ 350,00"),
    ("Farol ou lanterna quebrada (por unidade)", "R$ 450,00"),
    ("Para-brisa trincado ou quebrado", "R$ 900,00"),
    ("Risco ou amassado na lataria (por peça)", "R$ 300,00"),
    ("Tapete ou acessório extraviado", "R$ 80,00"),
    ("Odor de cigarro no interior do veículo", "R$ 300,00"),
    ("Remoção por guincho", "R$ 350,00"),
    ("Diária de pátio por apreensão", "R$ 100,00"),
    ("Atraso na devolução (por dia)", "R$ 150,00"),
    ("Bloqueio do veículo por atraso no pagamento", "R$ 150,00"),
    ("Desbloqueio do veículo", "R$ 100,00"),
    ("Violação ou remoção do rastreador", "R$ 2.000,00"),
];

const FUEL_TERMS: &str = "COMBUSTÍVEL: o veículo é entregue com o nível de combustível registrado na vistoria de saída e deverá ser devolvido no mesmo nível. A diferença será cobrada pelo preço médio do litro na região, acrescida da taxa de reabastecimento prevista nesta tabela.";

const CLEANING_TERMS: &str = "LIMPEZA: o veículo deverá ser devolvido em condições normais de limpeza, interna e externa. Sujeira excessiva, areia, manchas nos bancos ou odores serão cobrados conforme os valores de lavagem desta tabela.";

const CLOSING_TERMS: [&str; 3] = [
    "Os valores desta tabela poderão ser reajustados mediante comunicação prévia ao LOCATÁRIO, não se aplicando a avarias ocorridas antes do reajuste.",
    "Avarias não listadas serão apuradas mediante orçamento de oficina credenciada, cabendo ao LOCATÁRIO o pagamento integral do valor apurado.",
    "Os valores devidos poderão ser descontados da caução ou cobrados juntamente com a próxima parcela semanal da locação.",
];

const TEXT_SIZE: f64 = 10.0;
const ROW_SIZE: f64 = 9.5;
const PRICE_COLUMN: f64 = 110.0;
const CELL_PADDING: f64 = 4.0;
const HEADER_GRAY: f64 = 0.78;
const STRIPE_GRAY: f64 = 0.93;

pub struct TariffLayout;

impl TariffLayout {
    fn identification(input: &LayoutInput<'_>) -> String {
        format!(
            "LOCATÁRIO(A): {}, CPF nº {}. VEÍCULO: {} {}, placa {}, cor {}. Os valores abaixo integram o contrato de locação nº {} e aplicam-se durante toda a sua vigência.",
            input.var("client_name"),
            input.var("client_cpf"),
            input.var("vehicle_brand"),
            input.var("vehicle_model"),
            input.var("vehicle_plate"),
            input.var("vehicle_color"),
            input.var("document_number"),
        )
    }

    /// Draws one table row. Returns the state below the row.
    fn row(
        canvas: &mut Canvas,
        state: RenderState,
        cells: (&str, &str),
        face: FontFace,
        fill: Option<f64>,
    ) -> RenderState {
        let geometry = *canvas.geometry();
        let description_width = geometry.content_width() - PRICE_COLUMN - 2.0 * CELL_PADDING;
        let lines = wrap_text(cells.0, face, ROW_SIZE, description_width);
        let height = lines.len() as f64 * line_height(ROW_SIZE) + 2.0 * CELL_PADDING;

        if let Some(gray) = fill {
            canvas.push(
                state.page_index,
                DrawOp::FillRect {
                    x: geometry.margin_left,
                    y: state.cursor_y,
                    width: geometry.content_width(),
                    height,
                    gray,
                },
            );
        }

        let mut y = state.cursor_y + CELL_PADDING;
        for line in &lines {
            canvas.push(
                state.page_index,
                DrawOp::Text {
                    x: geometry.margin_left + CELL_PADDING,
                    y: y + ROW_SIZE,
                    size: ROW_SIZE,
                    face,
                    text: line.clone(),
                },
            );
            y += line_height(ROW_SIZE);
        }
        canvas.push(
            state.page_index,
            DrawOp::Text {
                x: geometry.width - geometry.margin_right - PRICE_COLUMN + CELL_PADDING,
                y: state.cursor_y + CELL_PADDING + ROW_SIZE,
                size: ROW_SIZE,
                face,
                text: cells.1.to_string(),
            },
        );

        state.advance(height)
    }

    fn row_height(description: &str, face: FontFace, canvas: &Canvas) -> f64 {
        let width = canvas.geometry().content_width() - PRICE_COLUMN - 2.0 * CELL_PADDING;
        wrap_text(description, face, ROW_SIZE, width).len() as f64 * line_height(ROW_SIZE)
            + 2.0 * CELL_PADDING
    }

    fn table(canvas: &mut Canvas, state: RenderState) -> RenderState {
        const HEADER: (&str, &str) = ("SERVIÇO / AVARIA", "VALOR");
        let header_height = Self::row_height(HEADER.0, FontFace::Bold, canvas);

        let state = canvas.ensure_space(
            state,
            header_height + Self::row_height(TARIFF_ROWS[0].0, FontFace::Regular, canvas),
        );
        let mut state = Self::row(canvas, state, HEADER, FontFace::Bold, Some(HEADER_GRAY));

        for (i, &(service, price)) in TARIFF_ROWS.iter().enumerate() {
            let height = Self::row_height(service, FontFace::Regular, canvas);
            let next = canvas.ensure_space(state, height);
            state = if next.page_index != state.page_index {
                let next = canvas.ensure_space(next, header_height + height);
                Self::row(canvas, next, HEADER, FontFace::Bold, Some(HEADER_GRAY))
            } else {
                next
            };
            let fill = (i % 2 == 1).then_some(STRIPE_GRAY);
            state = Self::row(canvas, state, (service, price), FontFace::Regular, fill);
        }
        state
    }
}

impl Layout for TariffLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::TariffTable
    }

    fn draw(
        &self,
        input: &LayoutInput<'_>,
        canvas: &mut Canvas,
        state: RenderState,
    ) -> RenderState {
        let state = canvas.draw_centered(state, &input.title, FontFace::Bold, 14.0);
        let subtitle = input.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE);
        let state = canvas.draw_centered(state, subtitle, FontFace::Regular, 11.0);
        let mut state = state.advance(12.0);

        let identification = Self::identification(input);
        for paragraph in [identification.as_str(), FUEL_TERMS, CLEANING_TERMS] {
            state = canvas.draw_paragraph(state, paragraph, FontFace::Regular, TEXT_SIZE);
            state = state.advance(8.0);
        }

        state = Self::table(canvas, state).advance(12.0);

        for paragraph in CLOSING_TERMS {
            state = canvas.draw_paragraph(state, paragraph, FontFace::Regular, TEXT_SIZE);
            state = state.advance(8.0);
        }

        let signers = [(input.var("client_name"), "LOCATÁRIO(A)")];
        draw_signatures(input, canvas, state.advance(12.0), &signers)
    }
}
