//! Template Store - document types, templates, ordered clauses and the
//! canonical catalog they are seeded from.

pub mod handlers;
pub mod models;
pub mod seed;
mod store;

pub use seed::seed_catalog;
pub use store::{Provision, TemplateStore};
