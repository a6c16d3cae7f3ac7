use indexmap::IndexMap;
use std::sync::Arc;

use crate::{
	models::{Chain, Contract, Event, Filter, Save},
	services::expression::{EvalContext, Value},
};

fn is_set(value: Option<u64>) -> bool {
	matches!(value, Some(v) if v > 0)
}

/// Time and block window of a schema or query, with polling intervals.
///
/// A zero value is treated the same as an absent one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
	pub start_time: Option<u64>,
	pub end_time: Option<u64>,
	pub time_interval: Option<u64>,
	pub start_block: Option<u64>,
	pub end_block: Option<u64>,
	pub block_interval: Option<u64>,
}

impl Window {
	/// Field-wise combination where values set on `self` win over `fallback`
	pub fn or(&self, fallback: &Window) -> Window {
		let pick = |own: Option<u64>, other: Option<u64>| if is_set(own) { own } else { other };
		Window {
			start_time: pick(self.start_time, fallback.start_time),
			end_time: pick(self.end_time, fallback.end_time),
			time_interval: pick(self.time_interval, fallback.time_interval),
			start_block: pick(self.start_block, fallback.start_block),
			end_block: pick(self.end_block, fallback.end_block),
			block_interval: pick(self.block_interval, fallback.block_interval),
		}
	}

	pub fn has_interval(&self) -> bool {
		is_set(self.time_interval) || is_set(self.block_interval)
	}

	/// Both ends of a block range or both ends of a time range are set
	pub fn has_historical_range(&self) -> bool {
		(is_set(self.start_block) && is_set(self.end_block))
			|| (is_set(self.start_time) && is_set(self.end_time))
	}
}

/// A named, chain-scoped extraction unit
#[derive(Debug, Clone)]
pub struct Query {
	pub name: String,
	pub chain: Chain,
	pub contracts: Vec<Contract>,

	/// Events not bound to a single contract
	pub events: Vec<Event>,

	pub save: Save,
	pub filter: Option<Filter>,

	/// Per-query overrides of the schema window
	pub window: Window,

	/// Base context for every evaluation of this query's results
	pub context: Arc<EvalContext>,
}

impl Query {
	pub fn has_global_events(&self) -> bool {
		!self.events.is_empty()
	}

	pub fn has_contract_events(&self) -> bool {
		self.contracts.iter().any(|contract| !contract.events.is_empty())
	}

	pub fn has_contract_methods(&self) -> bool {
		self.contracts.iter().any(|contract| !contract.methods.is_empty())
	}

	/// The query window with unset fields taken from `schema_window`
	pub fn effective_window(&self, schema_window: &Window) -> Window {
		self.window.or(schema_window)
	}

	pub fn contract(&self, identifier: &str) -> Option<&Contract> {
		self.contracts.iter().find(|contract| contract.matches(identifier))
	}

	/// Global event whose output identifier is `identifier`
	pub fn global_event(&self, identifier: &str) -> Option<&Event> {
		self.events
			.iter()
			.find(|event| event.output_name() == identifier)
	}

	/// Whether a result carrying `identifier` belongs to one of this query's bindings
	pub fn binds(&self, identifier: &str) -> bool {
		self.contract(identifier).is_some() || self.global_event(identifier).is_some()
	}
}

/// A fully loaded schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
	pub window: Window,

	/// Top-level variables, in declaration order
	pub variables: IndexMap<String, Value>,

	pub queries: Vec<Query>,

	/// Initial context enriched with the top-level variables
	pub context: Arc<EvalContext>,
}

impl Schema {
	/// Finds the query owning a result.
	///
	/// Among queries named `name`, the one binding `identifier` wins, otherwise the first.
	pub fn find_query(&self, name: &str, identifier: &str) -> Option<&Query> {
		self.queries
			.iter()
			.find(|query| query.name == name && query.binds(identifier))
			.or_else(|| self.queries.iter().find(|query| query.name == name))
	}
}
