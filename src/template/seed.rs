//! Canonical document catalog.
//!
//! Each document kind has exactly one definition here. Startup seeding and
//! the get-or-create/repair path both read from it, so every caller gets
//! the same legal text for the same template name.

use std::collections::BTreeSet;

use serde_json::json;
use uuid::Uuid;

use super::models::{NewClause, NewTemplate};
use super::store::{Provision, TemplateStore};
use crate::error::EngineError;
use crate::render::placeholder::identifiers;
use crate::render::LayoutKind;

pub struct CatalogType {
    pub name: &'static str,
    pub category: &'static str,
}

pub const RENTAL_TYPE: CatalogType = CatalogType {
    name: "Contrato de Locação",
    category: "rental",
};

pub const ANNEX_TYPE: CatalogType = CatalogType {
    name: "Anexos de Locação",
    category: "annex",
};

pub struct CatalogClause {
    pub title: &'static str,
    pub content: &'static str,
}

pub struct CatalogEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub document_type: &'static CatalogType,
    pub is_default: bool,
    pub number_prefix: &'static str,
    pub layout: Option<LayoutKind>,
    pub subtitle: Option<&'static str>,
    pub clauses: &'static [CatalogClause],
    /// Placeholders consumed outside clause text (tariff identification).
    pub extra_variables: &'static [&'static str],
}

impl CatalogEntry {
    pub fn content(&self) -> serde_json::Value {
        let mut content = json!({ "number_prefix": self.number_prefix });
        if let Some(layout) = self.layout {
            content["layout"] = json!(layout);
        }
        if let Some(subtitle) = self.subtitle {
            content["subtitle"] = json!(subtitle);
        }
        content
    }

    pub fn variables(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self
            .clauses
            .iter()
            .flat_map(|c| identifiers(c.content).into_iter().chain(identifiers(c.title)))
            .collect();
        names.extend(self.extra_variables.iter().map(|v| v.to_string()));
        names.into_iter().collect()
    }

    pub fn new_template(&self, type_id: Uuid) -> NewTemplate {
        NewTemplate {
            type_id,
            name: self.name.to_string(),
            version: 1,
            title: self.title.to_string(),
            content: self.content(),
            variables: self.variables(),
            active: true,
            is_default: self.is_default,
        }
    }

    pub fn new_clauses(&self, template_id: Uuid) -> Vec<NewClause> {
        self.clauses
            .iter()
            .enumerate()
            .map(|(i, clause)| NewClause {
                template_id,
                clause_number: i as i32 + 1,
                title: clause.title.to_string(),
                content: clause.content.to_string(),
                order_index: i as i32,
                required: true,
                variables: identifiers(clause.content),
            })
            .collect()
    }
}

const RENTAL_CONTRACT_CLAUSES: &[CatalogClause] = &[
    CatalogClause {
        title: "Do objeto",
        content: "O presente contrato tem por objeto a locação do veículo {{vehicle_brand}} {{vehicle_model}}, ano {{vehicle_year}}, cor {{vehicle_color}}, placa {{vehicle_plate}}, RENAVAM {{vehicle_renavam}}, chassi {{vehicle_chassis}}, de propriedade ou posse legítima da LOCADORA, para uso exclusivo do LOCATÁRIO.",
    },
    CatalogClause {
        title: "Do prazo",
        content: "A locação vigorará de {{rental_start_date}} a {{rental_end_date}}, podendo ser prorrogada mediante acordo entre as partes. A devolução antecipada deverá ser comunicada com antecedência mínima de 7 (sete) dias.",
    },
    CatalogClause {
        title: "Do valor e da forma de pagamento",
        content: "Pela locação, o LOCATÁRIO pagará à LOCADORA o valor semanal de {{weekly_amount}} ({{weekly_amount_words}}), com vencimento no mesmo dia da semana em que se iniciou a locação. O atraso superior a 2 (dois) dias autoriza o bloqueio remoto do veículo, sem prejuízo da cobrança dos valores devidos.",
    },
    CatalogClause {
        title: "Da caução",
        content: "Como garantia das obrigações assumidas, o LOCATÁRIO entrega à LOCADORA a quantia de {{deposit_amount}} ({{deposit_amount_words}}) a título de caução, que será restituída ao final da locação, deduzidos eventuais débitos, multas e avarias.",
    },
    CatalogClause {
        title: "Das obrigações do locatário",
        content: "São obrigações do LOCATÁRIO: (a) utilizar o veículo de forma diligente, conforme sua destinação; (b) não sublocar, ceder ou emprestar o veículo a terceiros; (c) manter o veículo em local seguro; (d) comunicar imediatamente à LOCADORA qualquer sinistro, furto, roubo ou apreensão; (e) arcar com combustível, lavagens e pequenas manutenções decorrentes do uso.",
    },
    CatalogClause {
        title: "Da manutenção",
        content: "As revisões preventivas serão realizadas pela LOCADORA ou por oficina por ela indicada, devendo o LOCATÁRIO apresentar o veículo nas datas agendadas. Reparos decorrentes de mau uso, negligência ou acidente causado pelo LOCATÁRIO serão por ele custeados.",
    },
    CatalogClause {
        title: "Das multas e infrações",
        content: "O LOCATÁRIO responde por todas as multas, pontuações e demais penalidades de trânsito ocorridas durante a vigência deste contrato, obrigando-se a realizar a indicação de condutor no prazo legal.",
    },
    CatalogClause {
        title: "Do rastreamento",
        content: "O veículo é monitorado por sistema de rastreamento, com o que o LOCATÁRIO expressamente concorda, sendo vedada qualquer tentativa de remoção ou violação do equipamento.",
    },
    CatalogClause {
        title: "Da rescisão",
        content: "O descumprimento de qualquer cláusula deste contrato autoriza a sua rescisão imediata pela parte inocente, com a devolução do veículo em até 24 (vinte e quatro) horas, sem prejuízo das perdas e danos apuradas.",
    },
    CatalogClause {
        title: "Do foro",
        content: "Fica eleito o foro da comarca de {{contract_city}} para dirimir quaisquer questões oriundas deste contrato, com renúncia a qualquer outro, por mais privilegiado que seja.",
    },
];

const RESPONSIBILITY_TERM_CLAUSES: &[CatalogClause] = &[CatalogClause {
    title: "Termo de responsabilidade",
    content: "Eu, {{client_name}}, inscrito(a) no CPF sob o nº {{client_cpf}}, declaro para os devidos fins que assumo integral responsabilidade civil, administrativa e criminal pelo veículo locado durante todo o período da locação, incluindo multas de trânsito, pontuação na CNH, apreensões e danos causados a terceiros.\n\nDeclaro ainda estar ciente de que o uso do veículo por terceiros não autorizados é expressamente proibido e poderá ensejar a rescisão imediata do contrato.\n\n{{contract_city}}, {{contract_date}}.\n\n\n\n_______________________________________\n{{client_name}}\nCPF: {{client_cpf}}",
}];

const DEPOSIT_RECEIPT_CLAUSES: &[CatalogClause] = &[CatalogClause {
    title: "Recibo",
    content: "Recebi de {{client_name}}, inscrito(a) no CPF sob o nº {{client_cpf}}, a quantia de {{deposit_amount}} ({{deposit_amount_words}}), referente à caução da locação do veículo {{vehicle_model}}, placa {{vehicle_plate}}, a ser restituída ao final do contrato, deduzidos eventuais débitos.\n\nPara clareza, firmo o presente recibo.\n\n{{contract_city}}, {{contract_date}}.\n\n\n\n_______________________________________\n{{franchisee_name}}\nCNPJ: {{franchisee_cnpj}}",
}];

const POWER_OF_ATTORNEY_CLAUSES: &[CatalogClause] = &[CatalogClause {
    title: "Procuração",
    content: "OUTORGANTE: {{franchisee_name}}, inscrita no CNPJ sob o nº {{franchisee_cnpj}}.\n\nOUTORGADO(A): {{client_name}}, inscrito(a) no CPF sob o nº {{client_cpf}}, RG nº {{client_rg}}, residente em {{client_address}}.\n\nPODERES: para conduzir o veículo {{vehicle_brand}} {{vehicle_model}}, placa {{vehicle_plate}}, RENAVAM {{vehicle_renavam}}, em todo o território nacional, podendo apresentá-lo a autoridades de trânsito e policiais, vedado o substabelecimento, a venda ou a oneração do bem. Válida enquanto vigorar o contrato de locação.\n\n{{contract_city}}, {{contract_date}}.\n\n\n\n_______________________________________\n{{franchisee_name}}",
}];

const MONITORING_DECLARATION_CLAUSES: &[CatalogClause] = &[CatalogClause {
    title: "Declaração de monitoramento",
    content: "Eu, {{client_name}}, inscrito(a) no CPF sob o nº {{client_cpf}}, declaro estar ciente de que o veículo {{vehicle_model}}, placa {{vehicle_plate}}, é monitorado por sistema de rastreamento e bloqueio remoto, e autorizo a LOCADORA a acessar os dados de localização durante a vigência da locação, inclusive para bloqueio em caso de inadimplência ou uso indevido.\n\n{{contract_city}}, {{contract_date}}.\n\n\n\n_______________________________________\n{{client_name}}\nCPF: {{client_cpf}}",
}];

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "rental-contract",
        title: "CONTRATO DE LOCAÇÃO DE VEÍCULO",
        document_type: &RENTAL_TYPE,
        is_default: true,
        number_prefix: "CONTRATO",
        layout: None,
        subtitle: None,
        clauses: RENTAL_CONTRACT_CLAUSES,
        // Party blocks and the signature date are drawn by the layout.
        extra_variables: &[
            "client_name",
            "client_cpf",
            "client_rg",
            "client_driver_license",
            "client_address",
            "client_city",
            "client_state",
            "client_phone",
            "franchisee_name",
            "franchisee_cnpj",
            "franchisee_address",
            "franchisee_city",
            "franchisee_state",
            "franchisee_representative",
            "contract_city",
            "contract_date_long",
        ],
    },
    CatalogEntry {
        name: "responsibility-term",
        title: "TERMO DE RESPONSABILIDADE",
        document_type: &ANNEX_TYPE,
        is_default: false,
        number_prefix: "TERMO",
        layout: None,
        subtitle: None,
        clauses: RESPONSIBILITY_TERM_CLAUSES,
        extra_variables: &[],
    },
    CatalogEntry {
        name: "deposit-receipt",
        title: "RECIBO DE CAUÇÃO",
        document_type: &ANNEX_TYPE,
        is_default: false,
        number_prefix: "RECIBO",
        layout: None,
        subtitle: None,
        clauses: DEPOSIT_RECEIPT_CLAUSES,
        extra_variables: &[],
    },
    CatalogEntry {
        name: "power-of-attorney",
        title: "PROCURAÇÃO PARTICULAR",
        document_type: &ANNEX_TYPE,
        is_default: false,
        number_prefix: "PROCURACAO",
        layout: None,
        subtitle: None,
        clauses: POWER_OF_ATTORNEY_CLAUSES,
        extra_variables: &[],
    },
    CatalogEntry {
        name: "monitoring-declaration",
        title: "DECLARAÇÃO DE CIÊNCIA DE MONITORAMENTO",
        document_type: &ANNEX_TYPE,
        is_default: false,
        number_prefix: "DECLARACAO",
        layout: None,
        subtitle: None,
        clauses: MONITORING_DECLARATION_CLAUSES,
        extra_variables: &[],
    },
    CatalogEntry {
        name: "tariff-schedule",
        title: "ANEXO - TABELA DE PREÇOS",
        document_type: &ANNEX_TYPE,
        is_default: true,
        number_prefix: "TABELA",
        layout: Some(LayoutKind::TariffTable),
        subtitle: Some("Tabela de Preços de Serviços e Avarias"),
        clauses: &[],
        extra_variables: &[
            "client_name",
            "client_cpf",
            "vehicle_brand",
            "vehicle_model",
            "vehicle_plate",
            "vehicle_color",
            "document_number",
            "contract_city",
            "contract_date_long",
        ],
    },
];

pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}

/// Creates missing catalog templates and restores clauses of templates that
/// have none. Safe to run on every start.
pub async fn seed_catalog(templates: &TemplateStore) -> Result<(), EngineError> {
    let (mut created, mut repaired) = (0, 0);
    for entry in CATALOG {
        match templates.provision(entry).await?.1 {
            Provision::Created => created += 1,
            Provision::Repaired => repaired += 1,
            Provision::Existing => {}
        }
    }
    log::info!(
        "Template catalog ready: {} entries, {} created, {} repaired",
        CATALOG.len(),
        created,
        repaired
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let names: BTreeSet<&str> = CATALOG.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_responsibility_term_needs_only_four_values() {
        let entry = find("responsibility-term").unwrap();
        assert_eq!(
            entry.variables(),
            vec!["client_cpf", "client_name", "contract_city", "contract_date"]
        );
    }

    #[test]
    fn test_rental_contract_declares_party_blocks() {
        let variables = find("rental-contract").unwrap().variables();
        for name in ["client_driver_license", "client_phone", "franchisee_representative"] {
            assert!(variables.iter().any(|v| v == name), "{name} not declared");
        }
    }

    #[test]
    fn test_clause_order_follows_definition() {
        let entry = find("rental-contract").unwrap();
        let clauses = entry.new_clauses(Uuid::new_v4());
        assert_eq!(clauses.len(), entry.clauses.len());
        for (i, clause) in clauses.iter().enumerate() {
            assert_eq!(clause.order_index, i as i32);
            assert_eq!(clause.clause_number, i as i32 + 1);
        }
        assert!(clauses[2].variables.contains(&"weekly_amount_words".to_string()));
    }

    #[test]
    fn test_content_carries_prefix_and_layout() {
        let content = find("tariff-schedule").unwrap().content();
        assert_eq!(content["number_prefix"], "TABELA");
        assert_eq!(content["layout"], "tariff-table");
    }
}
