//! Variable Resolver: business fields in, flat placeholder bag out.

pub mod format;
pub mod handlers;
pub mod models;
pub mod resolver;
pub mod words;

pub use models::{VariableValue, Variables};
pub use resolver::{RentalContext, VariableResolver};
