//! Deferred schema bodies.
//!
//! Transform, save and filter bodies are parsed with the rest of the schema but only
//! evaluated once a result-scoped context exists. They keep the parsed HCL tree.

use hcl::{expr::Expression, Body, Structure};
use indexmap::IndexMap;

use crate::services::expression::{evaluate, EvalContext, ExpressionError, Value};

/// Evaluates every attribute of `body`, in declaration order.
///
/// Returns nothing on the first failure, so callers never see a partial map.
fn decode_attributes(
	body: &Body,
	context: &EvalContext,
) -> Result<IndexMap<String, Value>, ExpressionError> {
	let mut values = IndexMap::new();
	for structure in body.iter() {
		match structure {
			Structure::Attribute(attr) => {
				let value = evaluate(attr.expr(), context).map_err(|source| {
					ExpressionError::Attribute {
						name: attr.key().to_string(),
						source: Box::new(source),
					}
				})?;
				values.insert(attr.key().to_string(), value);
			}
			Structure::Block(block) => {
				return Err(ExpressionError::Unsupported(format!(
					"unexpected block `{}`",
					block.identifier()
				)))
			}
		}
	}
	Ok(values)
}

/// Derives new named variables from a result
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
	body: Body,
}

impl Transform {
	pub fn new(body: Body) -> Self {
		Self { body }
	}

	pub fn decode(&self, context: &EvalContext) -> Result<IndexMap<String, Value>, ExpressionError> {
		decode_attributes(&self.body, context)
	}
}

/// Produces the final output values of a query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Save {
	body: Body,
}

impl Save {
	pub fn new(body: Body) -> Self {
		Self { body }
	}

	pub fn decode(&self, context: &EvalContext) -> Result<IndexMap<String, Value>, ExpressionError> {
		decode_attributes(&self.body, context)
	}
}

/// A list of boolean expressions gating whether a result is kept
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	expr: Expression,
}

impl Filter {
	pub fn new(expr: Expression) -> Self {
		Self { expr }
	}

	pub fn decode(&self, context: &EvalContext) -> Result<Vec<bool>, ExpressionError> {
		match evaluate(&self.expr, context)? {
			Value::List(items) => items
				.into_iter()
				.map(|item| match item {
					Value::Bool(b) => Ok(b),
					other => Err(ExpressionError::type_mismatch("bool", other.type_name())),
				})
				.collect(),
			other => Err(ExpressionError::type_mismatch("list of bool", other.type_name())),
		}
	}

	/// True when every condition holds
	pub fn passes(&self, context: &EvalContext) -> Result<bool, ExpressionError> {
		Ok(self.decode(context)?.into_iter().all(|condition| condition))
	}
}
