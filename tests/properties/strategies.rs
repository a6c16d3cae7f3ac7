use alloy::primitives::{Address, U256};
use chainquery::{
	models::Chain,
	services::expression::{RawValue, Value},
};
use proptest::prelude::*;

const MAX_ITEMS: usize = 8;

pub fn address_strategy() -> impl Strategy<Value = Address> {
	any::<[u8; 20]>().prop_map(Address::from)
}

/// Distinct addresses, rendered as lowercase hex
pub fn address_items_strategy() -> impl Strategy<Value = Vec<String>> {
	prop::collection::hash_set(address_strategy(), 0..MAX_ITEMS).prop_map(|addresses| {
		addresses
			.into_iter()
			.map(|address| address.to_string().to_lowercase())
			.collect()
	})
}

pub fn chain_strategy() -> impl Strategy<Value = Chain> {
	prop_oneof![
		Just(Chain::Ethereum),
		Just(Chain::Arbitrum),
		Just(Chain::Optimism),
		Just(Chain::Polygon),
	]
}

/// Integers exactly representable as f64
pub fn amount_strategy() -> impl Strategy<Value = u64> {
	0..(1u64 << 53)
}

pub fn raw_value_strategy() -> impl Strategy<Value = RawValue> {
	prop_oneof![
		address_strategy().prop_map(RawValue::Address),
		"[a-zA-Z0-9 _]{0,20}".prop_map(RawValue::String),
		amount_strategy().prop_map(|n| RawValue::Uint(U256::from(n))),
		any::<bool>().prop_map(RawValue::Bool),
		(-1.0e9..1.0e9f64).prop_map(RawValue::Float),
	]
}

pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
	prop_oneof![
		"[a-z]{0,10}".prop_map(Value::String),
		(-1.0e6..1.0e6f64).prop_map(Value::Number),
		any::<bool>().prop_map(Value::Bool),
	]
}
