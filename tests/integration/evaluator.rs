//! Runtime evaluation of results against loaded schemas.

use crate::integration::mocks::{ConfigDir, MockChainProvider, USDC, WETH};
use alloy::primitives::{Address, U256};
use chainquery::{
	models::{Chain, Schema},
	services::{
		evaluator::{generate_context_vars, EvaluationError, Outcome, RuntimeEvaluator},
		expression::{RawValue, Value},
	},
	utils::tests::builders::result::CallResultBuilder,
};
use std::{str::FromStr, sync::Arc, thread};

fn usdc() -> Address {
	Address::from_str(USDC).unwrap()
}

fn weth() -> Address {
	Address::from_str(WETH).unwrap()
}

fn evaluator() -> RuntimeEvaluator {
	RuntimeEvaluator::new(Arc::new(MockChainProvider::new()))
}

fn load(source: &str) -> Schema {
	ConfigDir::with_schema(source).load().unwrap()
}

fn transfers_schema() -> Schema {
	load(&format!(
		r#"
		variables = {{
			min_value = 100
		}}

		query "transfers" {{
			chain = "ethereum"

			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"

				event "Transfer" {{
					outputs = ["from", "to", "value"]
				}}

				transform {{
					doubled = value * 2
				}}
			}}

			filter = [
				doubled >= min_value,
				from != to,
			]

			save {{
				sender = from
				doubled = doubled
				tx = tx_hash
				index = tx_index
				event = event_name
			}}
		}}
		"#
	))
}

fn transfer(value: u64) -> chainquery::models::CallResult {
	CallResultBuilder::new()
		.query_name("transfers")
		.contract_event("Transfer")
		.contract_address(usdc())
		.output("from", Address::with_last_byte(1))
		.output("to", Address::with_last_byte(2))
		.output("value", value)
		.build()
}

#[test]
fn test_method_result_variables() {
	let result = CallResultBuilder::new()
		.output("amount", 42u64)
		.output("owner", usdc())
		.build();
	let vars = generate_context_vars(&result);

	assert_eq!(vars["amount"], Value::Number(42.0));
	assert_eq!(
		vars["owner"],
		Value::from("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
	);

	let mut names: Vec<_> = vars.keys().cloned().collect();
	names.sort();
	assert_eq!(
		names,
		vec![
			"amount",
			"block_hash",
			"blocknumber",
			"chain",
			"contract_address",
			"owner",
			"timestamp"
		]
	);
}

#[test]
fn test_event_result_variables() {
	let vars = generate_context_vars(&transfer(7));

	for name in ["tx_hash", "event_name", "tx_index"] {
		assert!(vars.contains_key(name), "missing {}", name);
	}
	assert_eq!(vars["value"], Value::Number(7.0));
	assert_eq!(vars["chain"], Value::from("ethereum"));
}

#[test]
fn test_inputs_follow_the_coercion_policy() {
	let result = CallResultBuilder::new()
		.input("account", usdc())
		.input("label", "treasury")
		.input("amount", RawValue::Uint(U256::from(5u64)))
		.input("active", RawValue::Bool(true))
		.build();
	let vars = generate_context_vars(&result);

	assert_eq!(
		vars["account"],
		Value::from("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
	);
	assert_eq!(vars["label"], Value::from("treasury"));
	assert_eq!(vars["amount"], Value::Number(5.0));
	assert_eq!(vars["active"], Value::Number(1.0));
}

#[test]
fn test_transform_feeds_save_and_filter() {
	let schema = transfers_schema();

	let output = evaluator()
		.evaluate(&schema, &transfer(60))
		.unwrap()
		.into_output()
		.unwrap();
	assert_eq!(output["doubled"], Value::Number(120.0));
	assert_eq!(
		output["sender"],
		Value::from(Address::with_last_byte(1).to_checksum(None))
	);
	assert_eq!(output["event"], Value::from("Transfer"));
	assert_eq!(output["index"], Value::Number(3.0));
	assert!(output["tx"].as_str().unwrap().starts_with("0x"));

	assert_eq!(
		evaluator().evaluate(&schema, &transfer(10)),
		Ok(Outcome::Filtered)
	);
}

#[test]
fn test_false_filter_suppresses_output_without_error() {
	let schema = load(&format!(
		r#"
		query "q" {{
			chain = "ethereum"
			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"
				method "totalSupply" {{
					outputs = ["supply"]
				}}
			}}
			filter = [true, false]
			save {{
				supply = supply
			}}
		}}
		"#
	));
	let result = CallResultBuilder::new()
		.query_name("q")
		.contract_address(usdc())
		.output("supply", 1u64)
		.build();

	let outcome = evaluator().evaluate(&schema, &result).unwrap();
	assert_eq!(outcome, Outcome::Filtered);
	assert_eq!(outcome.into_output(), None);
}

#[test]
fn test_reevaluation_is_idempotent() {
	let schema = transfers_schema();
	let result = transfer(500);

	let first = evaluator().evaluate(&schema, &result).unwrap();
	let second = evaluator().evaluate(&schema, &result).unwrap();
	assert_eq!(first, second);
}

#[test]
fn test_results_do_not_leak_into_each_other() {
	let schema = transfers_schema();

	evaluator().evaluate(&schema, &transfer(500)).unwrap();

	let context = &schema.queries[0].context;
	for name in ["value", "doubled", "tx_hash", "blocknumber"] {
		assert!(context.var(name).is_none(), "{} leaked", name);
	}
	assert!(context.func("balance").is_none());
}

#[test]
fn test_concurrent_evaluation_of_one_query() {
	let schema = transfers_schema();
	let evaluator = evaluator();

	thread::scope(|scope| {
		let handles: Vec<_> = (1..=8u64)
			.map(|i| {
				let schema = &schema;
				let evaluator = &evaluator;
				scope.spawn(move || evaluator.evaluate(schema, &transfer(i * 100)))
			})
			.collect();

		for (i, handle) in handles.into_iter().enumerate() {
			let output = handle.join().unwrap().unwrap().into_output().unwrap();
			assert_eq!(output["doubled"], Value::Number((i as f64 + 1.0) * 200.0));
		}
	});
}

#[test]
fn test_global_event_uses_its_own_transform() {
	let schema = load(
		r#"
		query "swaps" {
			chain = "arbitrum"

			event "Swap" {
				abi = "abis/pair.json"
				outputs = ["amount0In", "amount1Out"]

				transform {
					ratio = amount1Out / amount0In
				}
			}

			save {
				ratio = ratio
				chain = chain
			}
		}
		"#,
	);
	let result = CallResultBuilder::new()
		.query_name("swaps")
		.chain(Chain::Arbitrum)
		.global_event("Swap")
		.output("amount0In", 4u64)
		.output("amount1Out", 10u64)
		.build();

	let output = evaluator()
		.evaluate(&schema, &result)
		.unwrap()
		.into_output()
		.unwrap();
	assert_eq!(output["ratio"], Value::Number(2.5));
	assert_eq!(output["chain"], Value::from("arbitrum"));
}

#[test]
fn test_loop_results_find_their_own_query() {
	let schema = load(&format!(
		r#"
		loop {{
			items = ["{USDC}", "{WETH}"]

			query "supplies" {{
				chain = "ethereum"
				contract {{
					address = item
					abi = "abis/erc20.json"
					method "totalSupply" {{
						outputs = ["supply"]
					}}
					transform {{
						token = lower(item)
					}}
				}}
				save {{
					token = token
					supply = supply
				}}
			}}
		}}
		"#
	));

	let result = CallResultBuilder::new()
		.query_name("supplies")
		.contract_address(weth())
		.output("supply", 9u64)
		.build();

	let output = evaluator()
		.evaluate(&schema, &result)
		.unwrap()
		.into_output()
		.unwrap();
	assert_eq!(output["token"], Value::from(WETH));
}

#[test]
fn test_chain_functions_are_bound_to_the_result_block() {
	let schema = load(&format!(
		r#"
		query "holders" {{
			chain = "optimism"
			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"
				event "Transfer" {{
					outputs = ["to"]
				}}
			}}
			save {{
				native = balance(to)
				usdc = token_balance(to, contract_address)
			}}
		}}
		"#
	));

	let mut provider = MockChainProvider::new();
	provider
		.expect_balance()
		.withf(|chain, address, block| {
			*chain == Chain::Optimism && *address == Address::with_last_byte(2) && *block == 1234
		})
		.times(1)
		.returning(|_, _, _| Ok(1.5));
	provider
		.expect_token_balance()
		.withf(|chain, account, token, block| {
			*chain == Chain::Optimism
				&& *account == Address::with_last_byte(2)
				&& *token == usdc()
				&& *block == 1234
		})
		.times(1)
		.returning(|_, _, _, _| Ok(250.0));

	let result = CallResultBuilder::new()
		.query_name("holders")
		.chain(Chain::Optimism)
		.contract_event("Transfer")
		.contract_address(usdc())
		.block_number(1234)
		.output("to", Address::with_last_byte(2))
		.build();

	let output = RuntimeEvaluator::new(Arc::new(provider))
		.evaluate(&schema, &result)
		.unwrap()
		.into_output()
		.unwrap();
	assert_eq!(output["native"], Value::Number(1.5));
	assert_eq!(output["usdc"], Value::Number(250.0));
}

#[test]
fn test_provider_failure_is_a_save_error() {
	let schema = load(&format!(
		r#"
		query "holders" {{
			chain = "ethereum"
			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"
			}}
			save {{
				native = balance(contract_address)
			}}
		}}
		"#
	));

	let mut provider = MockChainProvider::new();
	provider
		.expect_balance()
		.returning(|_, _, _| Err(anyhow::anyhow!("rpc timeout")));

	let result = CallResultBuilder::new()
		.query_name("holders")
		.contract_address(usdc())
		.build();

	match RuntimeEvaluator::new(Arc::new(provider)).evaluate(&schema, &result) {
		Err(EvaluationError::DecodeError { block, message }) => {
			assert_eq!(block, "save of query `holders`");
			assert!(message.contains("rpc timeout"));
		}
		other => panic!("unexpected outcome: {:?}", other),
	}
}

#[test]
fn test_unknown_query_is_ignored() {
	let schema = transfers_schema();
	let result = CallResultBuilder::new().query_name("nope").build();

	let outcome = evaluator().evaluate(&schema, &result).unwrap();
	assert_eq!(outcome, Outcome::Ignored);
	assert_eq!(outcome.into_output(), None);
}
