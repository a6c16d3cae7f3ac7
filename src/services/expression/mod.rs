//! Expression evaluation for schema bodies.
//!
//! Provides the pieces every decode step relies on:
//! - `Value`: the dynamically-typed value model and the raw-value coercion policy
//! - `EvalContext`: layered variable and function tables
//! - `evaluate`: evaluation of HCL expression trees
//! - builtin and chain-scoped functions

mod context;
mod error;
mod eval;
mod functions;
mod value;

pub use context::{builtin_context, initial_context, loop_context, EvalContext, Function};
pub use error::ExpressionError;
pub use eval::evaluate;
pub use functions::{build_chain_functions, builtin_functions};
pub use value::{RawValue, Value};
