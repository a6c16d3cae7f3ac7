//! Structural decoding of schema bodies.
//!
//! [`BodyDecoder`] hands out the attributes and blocks of one HCL body, evaluating
//! attributes against a context, and rejects whatever is left over once the caller
//! is done. The `decode_*` functions build the schema tree on top of it.

use alloy::primitives::Address;
use hcl::{expr::Expression, Block, Body, Structure};
use indexmap::IndexMap;
use std::{str::FromStr, sync::Arc};

use crate::{
	models::{
		config::error::ConfigError, Chain, Contract, Event, Filter, Method, Query, Save,
		Transform, Window,
	},
	services::expression::{evaluate, EvalContext, Value},
};

/// Attributes and blocks of a single body, consumed as they are decoded
pub(crate) struct BodyDecoder<'a> {
	scope: String,
	attributes: IndexMap<&'a str, &'a Expression>,
	blocks: Vec<&'a Block>,
}

impl<'a> BodyDecoder<'a> {
	/// Splits `body` into attributes and blocks.
	///
	/// `scope` names the body in error messages, e.g. "query `supply`".
	pub fn new(body: &'a Body, scope: impl Into<String>) -> Result<Self, ConfigError> {
		let scope = scope.into();
		let mut attributes = IndexMap::new();
		let mut blocks = Vec::new();
		for structure in body.iter() {
			match structure {
				Structure::Attribute(attr) => {
					if attributes.insert(attr.key(), attr.expr()).is_some() {
						return Err(ConfigError::decode_error(format!(
							"{}: duplicate attribute `{}`",
							scope,
							attr.key()
						)));
					}
				}
				Structure::Block(block) => blocks.push(block),
			}
		}
		Ok(Self {
			scope,
			attributes,
			blocks,
		})
	}

	pub fn scope(&self) -> &str {
		&self.scope
	}

	/// Takes the raw expression of attribute `key`
	pub fn expr(&mut self, key: &str) -> Option<&'a Expression> {
		self.attributes.shift_remove(key)
	}

	pub fn value(&mut self, key: &str, context: &EvalContext) -> Result<Option<Value>, ConfigError> {
		match self.expr(key) {
			Some(expr) => evaluate(expr, context).map(Some).map_err(|e| {
				ConfigError::decode_error(format!("{}: attribute `{}`: {}", self.scope, key, e))
			}),
			None => Ok(None),
		}
	}

	/// Takes a non-negative integer attribute
	pub fn u64(&mut self, key: &str, context: &EvalContext) -> Result<Option<u64>, ConfigError> {
		let Some(value) = self.value(key, context)? else {
			return Ok(None);
		};
		match value.as_number() {
			Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 => Ok(Some(n as u64)),
			_ => Err(self.mismatch(key, "non-negative integer", &value)),
		}
	}

	pub fn string(&mut self, key: &str, context: &EvalContext) -> Result<Option<String>, ConfigError> {
		let Some(value) = self.value(key, context)? else {
			return Ok(None);
		};
		match value {
			Value::String(s) => Ok(Some(s)),
			other => Err(self.mismatch(key, "string", &other)),
		}
	}

	pub fn strings(
		&mut self,
		key: &str,
		context: &EvalContext,
	) -> Result<Option<Vec<String>>, ConfigError> {
		let Some(value) = self.value(key, context)? else {
			return Ok(None);
		};
		match &value {
			Value::List(items) => items
				.iter()
				.map(|item| match item {
					Value::String(s) => Ok(s.clone()),
					_ => Err(self.mismatch(key, "list of strings", &value)),
				})
				.collect::<Result<Vec<_>, _>>()
				.map(Some),
			_ => Err(self.mismatch(key, "list of strings", &value)),
		}
	}

	pub fn map(
		&mut self,
		key: &str,
		context: &EvalContext,
	) -> Result<Option<IndexMap<String, Value>>, ConfigError> {
		let Some(value) = self.value(key, context)? else {
			return Ok(None);
		};
		match value {
			Value::Map(entries) => Ok(Some(entries)),
			other => Err(self.mismatch(key, "object", &other)),
		}
	}

	/// Takes an object attribute whose values are rendered as strings
	pub fn string_map(
		&mut self,
		key: &str,
		context: &EvalContext,
	) -> Result<Option<IndexMap<String, String>>, ConfigError> {
		let Some(entries) = self.map(key, context)? else {
			return Ok(None);
		};
		entries
			.into_iter()
			.map(|(name, value)| match value {
				Value::String(s) => Ok((name, s)),
				scalar @ (Value::Number(_) | Value::Bool(_)) => Ok((name, scalar.to_string())),
				other => Err(self.mismatch(key, "object of strings", &other)),
			})
			.collect::<Result<IndexMap<_, _>, _>>()
			.map(Some)
	}

	/// Fails when the attribute was absent
	pub fn required<T>(&self, key: &str, value: Option<T>) -> Result<T, ConfigError> {
		value.ok_or_else(|| {
			ConfigError::decode_error(format!(
				"{}: missing required attribute `{}`",
				self.scope, key
			))
		})
	}

	/// Takes every block named `identifier`, in declaration order
	pub fn blocks(&mut self, identifier: &str) -> Vec<&'a Block> {
		let (taken, rest): (Vec<_>, Vec<_>) = self
			.blocks
			.drain(..)
			.partition(|block| block.identifier() == identifier);
		self.blocks = rest;
		taken
	}

	/// Takes at most one block named `identifier`
	pub fn optional_block(&mut self, identifier: &str) -> Result<Option<&'a Block>, ConfigError> {
		let mut blocks = self.blocks(identifier);
		if blocks.len() > 1 {
			return Err(ConfigError::decode_error(format!(
				"{}: only one `{}` block is allowed",
				self.scope, identifier
			)));
		}
		Ok(blocks.pop())
	}

	/// Rejects every attribute and block that was not taken
	pub fn finish(self) -> Result<(), ConfigError> {
		if let Some(key) = self.attributes.keys().next() {
			return Err(ConfigError::decode_error(format!(
				"{}: unknown attribute `{}`",
				self.scope, key
			)));
		}
		if let Some(block) = self.blocks.first() {
			return Err(ConfigError::decode_error(format!(
				"{}: unexpected block `{}`",
				self.scope,
				block.identifier()
			)));
		}
		Ok(())
	}

	fn mismatch(&self, key: &str, expected: &str, found: &Value) -> ConfigError {
		ConfigError::decode_error(format!(
			"{}: attribute `{}` must be a {}, found {}",
			self.scope,
			key,
			expected,
			found.type_name()
		))
	}
}

/// Returns the single label of `block`
pub(crate) fn single_label<'a>(block: &'a Block, scope: &str) -> Result<&'a str, ConfigError> {
	match block.labels() {
		[label] => Ok(label.as_str()),
		labels => Err(ConfigError::decode_error(format!(
			"{}: `{}` block takes exactly one label, found {}",
			scope,
			block.identifier(),
			labels.len()
		))),
	}
}

pub(crate) fn expect_no_labels(block: &Block, scope: &str) -> Result<(), ConfigError> {
	if block.labels().is_empty() {
		Ok(())
	} else {
		Err(ConfigError::decode_error(format!(
			"{}: `{}` block takes no labels",
			scope,
			block.identifier()
		)))
	}
}

/// Takes the window attributes shared by the schema root and queries
pub(crate) fn decode_window(
	decoder: &mut BodyDecoder<'_>,
	context: &EvalContext,
) -> Result<Window, ConfigError> {
	Ok(Window {
		start_time: decoder.u64("start_time", context)?,
		end_time: decoder.u64("end_time", context)?,
		time_interval: decoder.u64("time_interval", context)?,
		start_block: decoder.u64("start_block", context)?,
		end_block: decoder.u64("end_block", context)?,
		block_interval: decoder.u64("block_interval", context)?,
	})
}

/// Deferred bodies only hold attributes
fn deferred_body(block: &Block, scope: &str) -> Result<Body, ConfigError> {
	expect_no_labels(block, scope)?;
	if let Some(nested) = block.body().blocks().next() {
		return Err(ConfigError::decode_error(format!(
			"{}: `{}` block cannot contain block `{}`",
			scope,
			block.identifier(),
			nested.identifier()
		)));
	}
	Ok(block.body().clone())
}

fn decode_transform(block: Option<&Block>, scope: &str) -> Result<Option<Transform>, ConfigError> {
	block
		.map(|block| deferred_body(block, scope).map(Transform::new))
		.transpose()
}

/// Decodes a `query "<name>"` block, binding it to `context`
pub(crate) fn decode_query(block: &Block, context: &Arc<EvalContext>) -> Result<Query, ConfigError> {
	let name = single_label(block, "schema")?.to_string();
	let mut decoder = BodyDecoder::new(block.body(), format!("query `{}`", name))?;

	let chain = decoder.string("chain", context)?;
	let chain = decoder.required("chain", chain)?;
	let chain = Chain::from_str(&chain)
		.map_err(|e| ConfigError::decode_error(format!("{}: {}", decoder.scope(), e)))?;

	let window = decode_window(&mut decoder, context)?;
	let filter = decoder.expr("filter").cloned().map(Filter::new);

	let contracts = decoder
		.blocks("contract")
		.into_iter()
		.map(|block| decode_contract(block, context, decoder.scope()))
		.collect::<Result<Vec<_>, _>>()?;

	let events = decoder
		.blocks("event")
		.into_iter()
		.map(|block| decode_event(block, context, decoder.scope()))
		.collect::<Result<Vec<_>, _>>()?;
	if let Some(event) = events.iter().find(|event| event.abi_path.is_none()) {
		return Err(ConfigError::decode_error(format!(
			"{}: global event `{}` needs an `abi` attribute",
			decoder.scope(),
			event.name
		)));
	}

	let save = decoder.optional_block("save")?;
	let save = decoder.required("save", save)?;
	let save = Save::new(deferred_body(save, decoder.scope())?);

	decoder.finish()?;

	Ok(Query {
		name,
		chain,
		contracts,
		events,
		save,
		filter,
		window,
		context: context.clone(),
	})
}

fn decode_contract(
	block: &Block,
	context: &EvalContext,
	parent: &str,
) -> Result<Contract, ConfigError> {
	expect_no_labels(block, parent)?;
	let mut decoder = BodyDecoder::new(block.body(), format!("{}: contract", parent))?;

	let address_hex = decoder.string("address", context)?;
	let address_hex = decoder.required("address", address_hex)?;
	let address = Address::from_str(&address_hex).map_err(|e| {
		ConfigError::decode_error(format!(
			"{}: invalid address `{}`: {}",
			decoder.scope(),
			address_hex,
			e
		))
	})?;
	let abi_path = decoder.string("abi", context)?;
	let abi_path = decoder.required("abi", abi_path)?;

	let scope = format!("{}: contract `{}`", parent, address_hex);
	let methods = decoder
		.blocks("method")
		.into_iter()
		.map(|block| decode_method(block, context, &scope))
		.collect::<Result<Vec<_>, _>>()?;
	let events = decoder
		.blocks("event")
		.into_iter()
		.map(|block| decode_event(block, context, &scope))
		.collect::<Result<Vec<_>, _>>()?;
	let transform = decode_transform(decoder.optional_block("transform")?, &scope)?;

	decoder.finish()?;

	Ok(Contract {
		address_hex,
		address,
		abi_path,
		methods,
		events,
		transform,
		abi: None,
	})
}

fn decode_method(block: &Block, context: &EvalContext, parent: &str) -> Result<Method, ConfigError> {
	let name = single_label(block, parent)?.to_string();
	let mut decoder = BodyDecoder::new(block.body(), format!("{}: method `{}`", parent, name))?;

	let block_offset = decoder.u64("block_offset", context)?;
	let inputs = decoder.string_map("inputs", context)?.unwrap_or_default();
	let outputs = decoder.strings("outputs", context)?;
	let outputs = decoder.required("outputs", outputs)?;

	decoder.finish()?;

	Ok(Method {
		name,
		block_offset,
		inputs,
		outputs,
	})
}

fn decode_event(block: &Block, context: &EvalContext, parent: &str) -> Result<Event, ConfigError> {
	let name = single_label(block, parent)?.to_string();
	let scope = format!("{}: event `{}`", parent, name);
	let mut decoder = BodyDecoder::new(block.body(), scope.clone())?;

	let abi_path = decoder.string("abi", context)?;
	let outputs = decoder.strings("outputs", context)?;
	let outputs = decoder.required("outputs", outputs)?;
	let methods = decoder
		.blocks("method")
		.into_iter()
		.map(|block| decode_method(block, context, &scope))
		.collect::<Result<Vec<_>, _>>()?;
	let transform = decode_transform(decoder.optional_block("transform")?, &scope)?;

	decoder.finish()?;

	Ok(Event {
		name,
		abi_path,
		outputs,
		methods,
		transform,
		abi: None,
	})
}
