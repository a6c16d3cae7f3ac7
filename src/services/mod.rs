//! Services for schema evaluation.
//!
//! - `blockchain`: chain capabilities injected by the host
//! - `evaluator`: transform, save and filter over produced results
//! - `expression`: value model, contexts and expression evaluation

pub mod blockchain;
pub mod evaluator;
pub mod expression;
