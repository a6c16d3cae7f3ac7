//! Dynamically-typed values used by schema expressions.
//!
//! Every expression in a schema evaluates to a [`Value`]. Raw call and event data
//! coming from the chain is bridged into this model by [`RawValue::to_value`],
//! which implements the coercion policy:
//!
//! | raw value          | expression value |
//! |--------------------|------------------|
//! | address            | `String` (EIP-55 checksummed) |
//! | string             | `String`         |
//! | uint / int / float | `Number`         |
//! | bool               | `Number` (1 or 0) |

use alloy::{
	dyn_abi::DynSolValue,
	primitives::{hex, Address, I256, U256},
};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A value produced by evaluating an expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	String(String),
	Number(f64),
	Bool(bool),
	List(Vec<Value>),
	Map(IndexMap<String, Value>),
}

impl Value {
	/// Name of the value's type, used in error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::String(_) => "string",
			Self::Number(_) => "number",
			Self::Bool(_) => "bool",
			Self::List(_) => "list",
			Self::Map(_) => "map",
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s.as_str()),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
		match self {
			Self::Map(entries) => Some(entries),
			_ => None,
		}
	}

	/// Returns the numeric value, converting numeric strings the way HCL does
	/// for arithmetic operands.
	pub fn as_number(&self) -> Option<f64> {
		match self {
			Self::Number(n) => Some(*n),
			Self::String(s) => s.trim().parse::<f64>().ok(),
			_ => None,
		}
	}
}

/// Formats a number without a trailing fractional part when it is integral.
fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
		write!(f, "{:.0}", n)
	} else {
		write!(f, "{}", n)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::String(s) => write!(f, "{}", s),
			Self::Number(n) => format_number(*n, f),
			Self::Bool(b) => write!(f, "{}", b),
			Self::List(items) => {
				write!(f, "[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}", item)?;
				}
				write!(f, "]")
			}
			Self::Map(entries) => {
				write!(f, "{{")?;
				for (i, (key, value)) in entries.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{} = {}", key, value)?;
				}
				write!(f, "}}")
			}
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::List(value)
	}
}

/// A raw value decoded from a method call or an event log
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
	Address(Address),
	String(String),
	Uint(U256),
	Int(I256),
	Float(f64),
	Bool(bool),
}

impl RawValue {
	/// Converts the raw value into an expression value.
	///
	/// Addresses and strings become strings, everything else becomes a number.
	/// Integers wider than 53 bits lose precision.
	pub fn to_value(&self) -> Value {
		match self {
			Self::Address(address) => Value::String(address.to_checksum(None)),
			Self::String(s) => Value::String(s.clone()),
			Self::Uint(n) => Value::Number(n.to_string().parse().unwrap_or_default()),
			Self::Int(n) => Value::Number(n.to_string().parse().unwrap_or_default()),
			Self::Float(n) => Value::Number(*n),
			Self::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
		}
	}
}

impl From<Address> for RawValue {
	fn from(value: Address) -> Self {
		Self::Address(value)
	}
}

impl From<U256> for RawValue {
	fn from(value: U256) -> Self {
		Self::Uint(value)
	}
}

impl From<u64> for RawValue {
	fn from(value: u64) -> Self {
		Self::Uint(U256::from(value))
	}
}

impl From<&str> for RawValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl TryFrom<&DynSolValue> for RawValue {
	type Error = String;

	fn try_from(value: &DynSolValue) -> Result<Self, Self::Error> {
		match value {
			DynSolValue::Address(address) => Ok(Self::Address(*address)),
			DynSolValue::String(s) => Ok(Self::String(s.clone())),
			DynSolValue::Uint(n, _) => Ok(Self::Uint(*n)),
			DynSolValue::Int(n, _) => Ok(Self::Int(*n)),
			DynSolValue::Bool(b) => Ok(Self::Bool(*b)),
			DynSolValue::FixedBytes(word, size) => {
				Ok(Self::String(hex::encode_prefixed(&word[..*size])))
			}
			DynSolValue::Bytes(bytes) => Ok(Self::String(hex::encode_prefixed(bytes))),
			other => Err(format!("unsupported raw value: {:?}", other)),
		}
	}
}
