//! Loop expansion.
//!
//! A `loop` block holds a list of `items` and one or more query templates. Every item
//! produces one copy of each template, decoded against a context that only knows the
//! builtin functions and `item`.

use hcl::Block;
use std::sync::Arc;
use tracing::debug;

use crate::{
	models::{
		config::{
			decode::{decode_query, expect_no_labels, BodyDecoder},
			error::ConfigError,
		},
		Query,
	},
	services::expression::{loop_context, EvalContext, Value},
};

/// A decoded `loop` block
#[derive(Debug, Clone)]
pub struct LoopTemplate {
	pub items: Vec<Value>,
	pub queries: Vec<Block>,
}

impl LoopTemplate {
	/// Decodes the loop header; `items` is evaluated with `context`, the query
	/// templates are kept undecoded.
	pub fn decode(block: &Block, context: &EvalContext) -> Result<Self, ConfigError> {
		expect_no_labels(block, "schema")?;
		let mut decoder = BodyDecoder::new(block.body(), "loop")?;

		let items = decoder.value("items", context)?;
		let items = match decoder.required("items", items)? {
			Value::List(items) => items,
			other => {
				return Err(ConfigError::decode_error(format!(
					"loop: attribute `items` must be a list, found {}",
					other.type_name()
				)))
			}
		};
		let queries = decoder.blocks("query").into_iter().cloned().collect();

		decoder.finish()?;

		Ok(Self { items, queries })
	}

	pub fn expand(&self) -> Result<Vec<Query>, ConfigError> {
		expand(&self.queries, &self.items)
	}
}

/// Decodes every template once per item, in item order
pub fn expand(template: &[Block], items: &[Value]) -> Result<Vec<Query>, ConfigError> {
	let mut queries = Vec::with_capacity(template.len() * items.len());
	for item in items {
		let context = Arc::new(loop_context(item.clone()));
		for block in template {
			let query = decode_query(block, &context)?;
			debug!(query = %query.name, item = %item, "expanded loop query");
			queries.push(query);
		}
	}
	Ok(queries)
}
