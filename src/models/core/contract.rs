use alloy::{json_abi::JsonAbi, primitives::Address};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::models::Transform;

/// A contract targeted by a query
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
	/// Address as written in the schema
	pub address_hex: String,

	/// Parsed address, validated at load time
	pub address: Address,

	/// ABI file path, relative to the config directory
	pub abi_path: String,

	pub methods: Vec<Method>,
	pub events: Vec<Event>,
	pub transform: Option<Transform>,

	/// Loaded interface, attached by hydration
	pub abi: Option<Arc<JsonAbi>>,
}

impl Contract {
	/// Whether `identifier` names this contract, ignoring hex case
	pub fn matches(&self, identifier: &str) -> bool {
		self.address_hex.eq_ignore_ascii_case(identifier)
			|| identifier
				.parse::<Address>()
				.map(|address| address == self.address)
				.unwrap_or(false)
	}
}

/// A method call performed against a contract
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
	pub name: String,

	/// Blocks after the triggering event at which the call is issued; only used
	/// for methods nested under an event
	pub block_offset: Option<u64>,

	/// Argument name to expression source
	pub inputs: IndexMap<String, String>,

	pub outputs: Vec<String>,
}

/// An event decoded from logs, either of a contract or globally
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
	pub name: String,

	/// Required for global events; contract events fall back to the contract ABI
	pub abi_path: Option<String>,

	pub outputs: Vec<String>,
	pub methods: Vec<Method>,
	pub transform: Option<Transform>,
	pub abi: Option<Arc<JsonAbi>>,
}

impl Event {
	/// Identifier used for results of this event when it is global
	pub fn output_name(&self) -> String {
		format!("{}_events", self.name)
	}
}
