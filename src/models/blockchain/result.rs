//! Call and event results handed over by the chain executor.

use alloy::primitives::{Address, B256};
use indexmap::IndexMap;

use crate::{models::Chain, services::expression::RawValue};

/// Transaction data carried by event results
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
	pub tx_hash: B256,
	pub tx_index: u64,
	pub event_name: String,
}

/// What produced a result
#[derive(Debug, Clone, PartialEq)]
pub enum ResultKind {
	/// A contract method call
	Method,
	/// An event emitted by one of the query's contracts
	ContractEvent(EventLog),
	/// An event matched by a global event binding
	GlobalEvent(EventLog),
}

/// One observed method call or event
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
	/// Name of the query the result was produced for
	pub query_name: String,

	pub kind: ResultKind,

	/// Contract address for contract-scoped results, event output identifier for
	/// global events
	pub identifier: String,

	pub chain: Chain,

	/// Called contract, or the emitter of the log
	pub contract_address: Address,

	pub block_number: u64,

	/// Block timestamp in unix seconds
	pub timestamp: u64,

	pub block_hash: B256,

	/// Method arguments, in call order
	pub inputs: IndexMap<String, RawValue>,

	/// Method return values or decoded event fields
	pub outputs: IndexMap<String, RawValue>,
}

impl CallResult {
	pub fn event_log(&self) -> Option<&EventLog> {
		match &self.kind {
			ResultKind::Method => None,
			ResultKind::ContractEvent(log) | ResultKind::GlobalEvent(log) => Some(log),
		}
	}
}
