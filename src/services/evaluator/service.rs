//! Runtime evaluation of call and event results.
//!
//! For every result the evaluator layers a fresh context over the owning query's
//! context, then runs transform, save and filter against it. The query context is
//! never written to, so evaluations are independent of each other and can run
//! concurrently.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{
	models::{CallResult, Query, ResultKind, Schema, Transform},
	services::{
		blockchain::ChainFunctionProvider,
		evaluator::error::EvaluationError,
		expression::{build_chain_functions, EvalContext, Value},
	},
};

/// What happened to a single result
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	/// The save values of a result that passed the filter
	Saved(IndexMap<String, Value>),
	/// The filter rejected the result
	Filtered,
	/// No query matches the result
	Ignored,
}

impl Outcome {
	/// The save values, if any
	pub fn into_output(self) -> Option<IndexMap<String, Value>> {
		match self {
			Self::Saved(values) => Some(values),
			Self::Filtered | Self::Ignored => None,
		}
	}
}

/// Derives the variables a result exposes to transform, filter and save.
///
/// Every result provides `contract_address`, `blocknumber`, `timestamp`, `block_hash`
/// and `chain`. Events add `tx_hash`, `event_name` and `tx_index`. Raw inputs and
/// outputs follow, outputs last.
pub fn generate_context_vars(result: &CallResult) -> IndexMap<String, Value> {
	let mut vars = IndexMap::new();
	vars.insert(
		"contract_address".to_string(),
		Value::String(result.contract_address.to_checksum(None)),
	);
	vars.insert("blocknumber".to_string(), Value::from(result.block_number));
	vars.insert("timestamp".to_string(), Value::from(result.timestamp));
	vars.insert(
		"block_hash".to_string(),
		Value::String(result.block_hash.to_string()),
	);
	vars.insert("chain".to_string(), Value::from(result.chain.as_str()));

	if let Some(log) = result.event_log() {
		vars.insert("tx_hash".to_string(), Value::String(log.tx_hash.to_string()));
		vars.insert("event_name".to_string(), Value::from(log.event_name.as_str()));
		vars.insert("tx_index".to_string(), Value::from(log.tx_index));
	}

	for (name, raw) in result.inputs.iter().chain(result.outputs.iter()) {
		vars.insert(name.clone(), raw.to_value());
	}

	vars
}

/// Evaluates results against a loaded schema
#[derive(Clone)]
pub struct RuntimeEvaluator {
	provider: Arc<dyn ChainFunctionProvider>,
}

impl RuntimeEvaluator {
	/// Creates an evaluator backing `balance` and `token_balance` with `provider`
	pub fn new(provider: Arc<dyn ChainFunctionProvider>) -> Self {
		Self { provider }
	}

	/// Runs transform, save and filter for one result.
	///
	/// # Errors
	/// - Returns `EvaluationError::DecodeError` naming the transform, save or filter
	///   that failed
	#[instrument(skip_all, fields(query = %result.query_name, identifier = %result.identifier))]
	pub fn evaluate(&self, schema: &Schema, result: &CallResult) -> Result<Outcome, EvaluationError> {
		let Some(query) = schema.find_query(&result.query_name, &result.identifier) else {
			warn!("no query named `{}`, ignoring result", result.query_name);
			return Ok(Outcome::Ignored);
		};

		let mut context = self.result_context(query, result);
		self.eval_transforms(query, result, &mut context)?;
		let output = self.eval_save(query, &context)?;

		if !self.eval_filter(query, &context)? {
			debug!(block = result.block_number, "result filtered out");
			return Ok(Outcome::Filtered);
		}

		debug!(block = result.block_number, values = output.len(), "result saved");
		Ok(Outcome::Saved(output))
	}

	/// Overlay of the query context with the result's variables and chain functions
	fn result_context(&self, query: &Query, result: &CallResult) -> EvalContext {
		let mut context = EvalContext::layered(query.context.clone());
		context.extend_vars(generate_context_vars(result));
		context.extend_funcs(build_chain_functions(
			self.provider.clone(),
			result.chain,
			result.block_number,
		));
		context
	}

	/// Applies the transforms bound to the result, merging each one whole.
	///
	/// Contract-scoped results use the transform of the contract at the result
	/// identifier, followed by the transform of the emitting event for contract
	/// events. Global events use the transform of the event whose output identifier
	/// matches.
	fn eval_transforms(
		&self,
		query: &Query,
		result: &CallResult,
		context: &mut EvalContext,
	) -> Result<(), EvaluationError> {
		let mut transforms: Vec<(String, &Transform)> = Vec::new();
		match &result.kind {
			ResultKind::GlobalEvent(_) => {
				if let Some(event) = query.global_event(&result.identifier) {
					if let Some(transform) = &event.transform {
						transforms.push((format!("transform of event `{}`", event.name), transform));
					}
				}
			}
			kind => {
				if let Some(contract) = query.contract(&result.identifier) {
					if let Some(transform) = &contract.transform {
						transforms.push((
							format!("transform of contract `{}`", contract.address_hex),
							transform,
						));
					}
					if let ResultKind::ContractEvent(log) = kind {
						let event = contract
							.events
							.iter()
							.find(|event| event.name == log.event_name);
						if let Some(event) = event {
							if let Some(transform) = &event.transform {
								transforms.push((
									format!("transform of event `{}`", event.name),
									transform,
								));
							}
						}
					}
				}
			}
		}

		for (block, transform) in transforms {
			let derived = transform
				.decode(context)
				.map_err(|e| EvaluationError::decode_error(block, e.to_string()))?;
			context.extend_vars(derived);
		}
		Ok(())
	}

	fn eval_save(
		&self,
		query: &Query,
		context: &EvalContext,
	) -> Result<IndexMap<String, Value>, EvaluationError> {
		query.save.decode(context).map_err(|e| {
			EvaluationError::decode_error(format!("save of query `{}`", query.name), e.to_string())
		})
	}

	/// True when there is no filter or every condition holds
	fn eval_filter(&self, query: &Query, context: &EvalContext) -> Result<bool, EvaluationError> {
		match &query.filter {
			Some(filter) => filter.passes(context).map_err(|e| {
				EvaluationError::decode_error(
					format!("filter of query `{}`", query.name),
					e.to_string(),
				)
			}),
			None => Ok(true),
		}
	}
}
