//! Schema loading.
//!
//! This module implements the ConfigLoader trait for Schema, loading
//! `schema.hcl` from a configuration directory in phases:
//! 1. top-level window and `variables`, evaluated with the initial context
//! 2. direct `query` blocks, evaluated with the context enriched by the variables
//! 3. the optional `loop` block, expanded once per item
//! 4. interface descriptors for every contract and event

use hcl::Body;
use std::{collections::HashSet, fs, path::Path, sync::Arc};
use tracing::{debug, info, instrument};

use crate::{
	models::{
		config::{
			decode::{decode_query, decode_window, BodyDecoder},
			error::ConfigError,
			interface::InterfaceHydrator,
			loop_expander::LoopTemplate,
			validation,
		},
		ConfigLoader, RunOptions, Schema,
	},
	services::expression::initial_context,
	utils::clock::{Clock, SystemClock},
};

/// Name of the schema file inside a configuration directory
pub const SCHEMA_FILE: &str = "schema.hcl";

impl Schema {
	/// Loads `<config_dir>/schema.hcl`, reading `now` from `clock`
	#[instrument(skip(clock), fields(config_dir = %config_dir.display()))]
	pub fn load_with_clock(config_dir: &Path, clock: &dyn Clock) -> Result<Self, ConfigError> {
		let schema_path = config_dir.join(SCHEMA_FILE);
		let source = fs::read_to_string(&schema_path).map_err(|e| {
			ConfigError::read_error(format!("{}: {}", schema_path.display(), e))
		})?;

		let mut schema = Self::decode_str(&source, clock)?;

		let mut hydrator = InterfaceHydrator::new(config_dir);
		for query in &mut schema.queries {
			hydrator.hydrate(query)?;
		}

		info!(queries = schema.queries.len(), "loaded schema");
		Ok(schema)
	}

	/// Decodes schema text without loading interface descriptors
	pub fn decode_str(source: &str, clock: &dyn Clock) -> Result<Self, ConfigError> {
		let body: Body = hcl::parse(source)?;
		let mut decoder = BodyDecoder::new(&body, "schema")?;

		let mut context = initial_context(clock);
		let window = decode_window(&mut decoder, &context)?;
		let variables = decoder.map("variables", &context)?.unwrap_or_default();
		context.extend_vars(variables.clone());
		let context = Arc::new(context);

		let query_blocks = decoder.blocks("query");
		let loop_block = decoder.optional_block("loop")?;
		decoder.finish()?;

		let mut queries = Vec::new();
		let mut names = HashSet::new();
		for block in query_blocks {
			let query = decode_query(block, &context)?;
			if !names.insert(query.name.clone()) {
				return Err(ConfigError::decode_error(format!(
					"schema: duplicate query `{}`",
					query.name
				)));
			}
			debug!(query = %query.name, chain = %query.chain, "decoded query");
			queries.push(query);
		}

		if let Some(block) = loop_block {
			let template = LoopTemplate::decode(block, &context)?;
			queries.extend(template.expand()?);
		}

		Ok(Self {
			window,
			variables,
			queries,
			context,
		})
	}
}

impl ConfigLoader for Schema {
	/// Load a schema from a configuration directory
	///
	/// Uses the system clock for `now`.
	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		Self::load_with_clock(path, &SystemClock)
	}

	/// Validate the schema for the given run mode
	fn validate(&self, options: &RunOptions) -> Result<(), ConfigError> {
		validation::validate(self, options).map_err(ConfigError::validation_error)
	}
}
