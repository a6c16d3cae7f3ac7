//! Functions available to schema expressions.
//!
//! - Builtin functions are pure and present in every context.
//! - Chain functions (`balance`, `token_balance`) are bound per evaluated result:
//!   they close over the result's chain and block number, so expressions read the
//!   historical state at exactly that block.

use std::{fmt::Write, str::FromStr, sync::Arc};

use alloy::primitives::Address;
use chrono::{TimeZone, Utc};

use crate::{
	models::Chain,
	services::{
		blockchain::ChainFunctionProvider,
		expression::{Function, Value},
	},
};

fn expect_arity(args: &[Value], arity: usize) -> Result<(), String> {
	if args.len() != arity {
		return Err(format!(
			"expected {} argument(s), got {}",
			arity,
			args.len()
		));
	}
	Ok(())
}

fn string_arg(args: &[Value], index: usize) -> Result<&str, String> {
	match args.get(index) {
		Some(Value::String(s)) => Ok(s.as_str()),
		Some(other) => Err(format!(
			"argument {} must be a string, found {}",
			index + 1,
			other.type_name()
		)),
		None => Err(format!("missing argument {}", index + 1)),
	}
}

fn number_arg(args: &[Value], index: usize) -> Result<f64, String> {
	match args.get(index) {
		Some(value) => value.as_number().ok_or_else(|| {
			format!(
				"argument {} must be a number, found {}",
				index + 1,
				value.type_name()
			)
		}),
		None => Err(format!("missing argument {}", index + 1)),
	}
}

fn list_arg(args: &[Value], index: usize) -> Result<&[Value], String> {
	match args.get(index) {
		Some(Value::List(items)) => Ok(items.as_slice()),
		Some(other) => Err(format!(
			"argument {} must be a list, found {}",
			index + 1,
			other.type_name()
		)),
		None => Err(format!("missing argument {}", index + 1)),
	}
}

fn address_arg(args: &[Value], index: usize) -> Result<Address, String> {
	let raw = string_arg(args, index)?;
	Address::from_str(raw).map_err(|e| format!("invalid address `{}`: {}", raw, e))
}

fn unary_number(f: fn(f64) -> f64) -> Function {
	Function::new(move |args| {
		expect_arity(args, 1)?;
		Ok(Value::Number(f(number_arg(args, 0)?)))
	})
}

fn fold_numbers(f: fn(f64, f64) -> f64) -> Function {
	Function::new(move |args| {
		if args.is_empty() {
			return Err("expected at least one argument".to_string());
		}
		let mut acc = number_arg(args, 0)?;
		for index in 1..args.len() {
			acc = f(acc, number_arg(args, index)?);
		}
		Ok(Value::Number(acc))
	})
}

/// The builtin function table
pub fn builtin_functions() -> Vec<(String, Function)> {
	vec![
		(
			"upper".to_string(),
			Function::new(|args| {
				expect_arity(args, 1)?;
				Ok(Value::String(string_arg(args, 0)?.to_uppercase()))
			}),
		),
		(
			"lower".to_string(),
			Function::new(|args| {
				expect_arity(args, 1)?;
				Ok(Value::String(string_arg(args, 0)?.to_lowercase()))
			}),
		),
		(
			"length".to_string(),
			Function::new(|args| {
				expect_arity(args, 1)?;
				let length = match &args[0] {
					Value::String(s) => s.chars().count(),
					Value::List(items) => items.len(),
					Value::Map(entries) => entries.len(),
					other => return Err(format!("cannot take length of {}", other.type_name())),
				};
				Ok(Value::from(length as u64))
			}),
		),
		(
			"concat".to_string(),
			Function::new(|args| {
				let mut joined = Vec::new();
				for index in 0..args.len() {
					joined.extend_from_slice(list_arg(args, index)?);
				}
				Ok(Value::List(joined))
			}),
		),
		(
			"join".to_string(),
			Function::new(|args| {
				expect_arity(args, 2)?;
				let separator = string_arg(args, 0)?;
				let parts = list_arg(args, 1)?
					.iter()
					.map(|item| item.to_string())
					.collect::<Vec<_>>();
				Ok(Value::String(parts.join(separator)))
			}),
		),
		(
			"contains".to_string(),
			Function::new(|args| {
				expect_arity(args, 2)?;
				Ok(Value::Bool(list_arg(args, 0)?.contains(&args[1])))
			}),
		),
		("min".to_string(), fold_numbers(f64::min)),
		("max".to_string(), fold_numbers(f64::max)),
		("abs".to_string(), unary_number(f64::abs)),
		("floor".to_string(), unary_number(f64::floor)),
		("ceil".to_string(), unary_number(f64::ceil)),
		(
			"parse_decimals".to_string(),
			Function::new(|args| {
				expect_arity(args, 2)?;
				let value = number_arg(args, 0)?;
				let decimals = number_arg(args, 1)?;
				Ok(Value::Number(value / 10f64.powf(decimals)))
			}),
		),
		(
			"format_date".to_string(),
			Function::new(|args| {
				expect_arity(args, 2)?;
				let format = string_arg(args, 0)?;
				let timestamp = number_arg(args, 1)?;
				let date = Utc
					.timestamp_opt(timestamp as i64, 0)
					.single()
					.ok_or_else(|| format!("invalid timestamp {}", timestamp))?;
				let mut rendered = String::new();
				write!(rendered, "{}", date.format(format))
					.map_err(|_| format!("invalid date format `{}`", format))?;
				Ok(Value::String(rendered))
			}),
		),
		(
			"tostring".to_string(),
			Function::new(|args| {
				expect_arity(args, 1)?;
				match &args[0] {
					value @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
						Ok(Value::String(value.to_string()))
					}
					other => Err(format!("cannot convert {} to string", other.type_name())),
				}
			}),
		),
		(
			"tonumber".to_string(),
			Function::new(|args| {
				expect_arity(args, 1)?;
				Ok(Value::Number(number_arg(args, 0)?))
			}),
		),
	]
}

/// Builds the chain functions bound to `chain` at `block_number`
pub fn build_chain_functions(
	provider: Arc<dyn ChainFunctionProvider>,
	chain: Chain,
	block_number: u64,
) -> Vec<(String, Function)> {
	let balance_provider = provider.clone();
	let token_provider = provider;

	vec![
		(
			"balance".to_string(),
			Function::new(move |args| {
				expect_arity(args, 1)?;
				let address = address_arg(args, 0)?;
				balance_provider
					.balance(chain, address, block_number)
					.map(Value::Number)
					.map_err(|e| e.to_string())
			}),
		),
		(
			"token_balance".to_string(),
			Function::new(move |args| {
				expect_arity(args, 2)?;
				let account = address_arg(args, 0)?;
				let token = address_arg(args, 1)?;
				token_provider
					.token_balance(chain, account, token, block_number)
					.map(Value::Number)
					.map_err(|e| e.to_string())
			}),
		),
	]
}
