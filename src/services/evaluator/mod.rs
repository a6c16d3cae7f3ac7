//! Runtime evaluation of results against a loaded schema.
//!
//! - `RuntimeEvaluator`: runs transform, save and filter for one result
//! - `Outcome`: saved values, filtered or ignored
//! - `generate_context_vars`: the variables a result exposes to expressions

mod error;
mod service;

pub use error::EvaluationError;
pub use service::{generate_context_vars, Outcome, RuntimeEvaluator};
