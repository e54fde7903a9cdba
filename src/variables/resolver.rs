//! Turns business records (client, vehicle, rental, franchisee) into the flat
//! placeholder bag used by templates.
//!
//! Resolution is total: missing optional values fall back to configured
//! defaults or to an empty string, never to an error.

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::format::{format_brl, format_date_br, format_date_long};
use super::models::Variables;
use super::words::amount_in_words;
use crate::config::EngineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub driver_license: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VehicleInfo {
    pub model: Option<String>,
    pub brand: Option<String>,
    pub plate: Option<String>,
    pub color: Option<String>,
    pub year: Option<i32>,
    pub renavam: Option<String>,
    pub chassis: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RentalInfo {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weekly_amount: Option<f64>,
    pub deposit_amount: Option<f64>,
    pub contract_city: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FranchiseeInfo {
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub representative: Option<String>,
}

/// Everything a caller knows about the rental a document is produced for.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RentalContext {
    pub client: ClientInfo,
    pub vehicle: VehicleInfo,
    pub rental: RentalInfo,
    pub franchisee: FranchiseeInfo,
    /// Prefix of the display number, e.g. `TERMO`.
    pub document_prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VariableResolver {
    default_state: String,
    default_company_name: String,
    default_city: String,
}

impl VariableResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_state: config.default_state.clone(),
            default_company_name: config.default_company_name.clone(),
            default_city: config.default_city.clone(),
        }
    }

    pub fn resolve(&self, ctx: &RentalContext) -> Variables {
        self.resolve_at(ctx, Local::now())
    }

    /// Resolves against an explicit clock so output is reproducible.
    pub fn resolve_at(&self, ctx: &RentalContext, now: DateTime<Local>) -> Variables {
        let mut vars = Variables::new();
        let client = &ctx.client;
        let vehicle = &ctx.vehicle;
        let rental = &ctx.rental;
        let franchisee = &ctx.franchisee;

        vars.insert("client_name", text(&client.name));
        vars.insert("client_cpf", text(&client.cpf));
        vars.insert("client_rg", text(&client.rg));
        vars.insert("client_address", text(&client.address));
        vars.insert("client_city", text(&client.city));
        vars.insert("client_state", or_default(&client.state, &self.default_state));
        vars.insert("client_phone", text(&client.phone));
        vars.insert("client_email", text(&client.email));
        vars.insert("client_driver_license", text(&client.driver_license));

        vars.insert("vehicle_model", text(&vehicle.model));
        vars.insert("vehicle_brand", text(&vehicle.brand));
        vars.insert("vehicle_plate", text(&vehicle.plate));
        vars.insert("vehicle_color", text(&vehicle.color));
        vars.insert(
            "vehicle_year",
            vehicle.year.map(|y| y.to_string()).unwrap_or_default(),
        );
        vars.insert("vehicle_renavam", text(&vehicle.renavam));
        vars.insert("vehicle_chassis", text(&vehicle.chassis));

        vars.insert(
            "franchisee_name",
            or_default(&franchisee.name, &self.default_company_name),
        );
        vars.insert("franchisee_cnpj", text(&franchisee.cnpj));
        vars.insert("franchisee_address", text(&franchisee.address));
        vars.insert(
            "franchisee_city",
            or_default(&franchisee.city, &self.default_city),
        );
        vars.insert(
            "franchisee_state",
            or_default(&franchisee.state, &self.default_state),
        );
        vars.insert("franchisee_representative", text(&franchisee.representative));

        vars.insert(
            "rental_start_date",
            rental.start_date.map(|d| format_date_br(&d)).unwrap_or_default(),
        );
        vars.insert(
            "rental_end_date",
            rental.end_date.map(|d| format_date_br(&d)).unwrap_or_default(),
        );

        let weekly = rental.weekly_amount.unwrap_or(0.0);
        vars.insert("weekly_amount", format_brl(weekly));
        vars.insert("weekly_amount_words", amount_in_words(weekly));
        let deposit = rental.deposit_amount.unwrap_or(0.0);
        vars.insert("deposit_amount", format_brl(deposit));
        vars.insert("deposit_amount_words", amount_in_words(deposit));

        let city = rental
            .contract_city
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| franchisee.city.clone().filter(|c| !c.trim().is_empty()))
            .unwrap_or_else(|| self.default_city.clone());
        vars.insert("contract_city", city);

        let today = now.date_naive();
        vars.insert("contract_date", format_date_br(&today));
        vars.insert("contract_date_long", format_date_long(&today));

        let prefix = ctx
            .document_prefix
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("DOC");
        vars.insert("document_number", display_number(prefix, now));

        vars
    }
}

/// `<PREFIX>-<YEAR>-<MICROS>` display number for an outgoing document.
fn display_number(prefix: &str, now: DateTime<Local>) -> String {
    format!(
        "{}-{}-{}",
        prefix.trim().to_uppercase(),
        now.year(),
        now.timestamp_micros()
    )
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn or_default(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}
