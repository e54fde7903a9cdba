//! Generated documents: generation, numbering and the status workflow.

mod generator;
pub mod handlers;
pub mod models;
pub mod numbering;
mod workflow;

pub use generator::DocumentGenerator;
pub use workflow::StatusWorkflow;
