use crate::properties::strategies::{address_strategy, amount_strategy, chain_strategy};
use alloy::primitives::Address;
use chainquery::{
	models::{Chain, Schema},
	services::{
		blockchain::ChainFunctionProvider,
		evaluator::{Outcome, RuntimeEvaluator},
		expression::Value,
	},
	utils::{clock::FixedClock, tests::builders::result::CallResultBuilder},
};
use proptest::{prelude::*, test_runner::Config};
use std::sync::Arc;

/// Reports the block number as the balance
struct BlockEcho;

impl ChainFunctionProvider for BlockEcho {
	fn balance(&self, _chain: Chain, _address: Address, block: u64) -> anyhow::Result<f64> {
		Ok(block as f64)
	}

	fn token_balance(
		&self,
		_chain: Chain,
		_account: Address,
		_token: Address,
		block: u64,
	) -> anyhow::Result<f64> {
		Ok(block as f64)
	}
}

fn schema(contract: Address) -> Schema {
	Schema::decode_str(
		&format!(
			r#"
			variables = {{
				threshold = 1000
			}}

			query "amounts" {{
				chain = "ethereum"
				contract {{
					address = "{contract}"
					abi = "erc20.json"
					method "balanceOf" {{
						outputs = ["amount"]
					}}
					transform {{
						doubled = amount * 2
						held = balance(contract_address)
					}}
				}}
				filter = [doubled >= threshold]
				save {{
					doubled = doubled
					held = held
					chain = chain
				}}
			}}
			"#
		),
		&FixedClock::from_timestamp(1_700_000_000),
	)
	.unwrap()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_filter_decides_outcome(
		contract in address_strategy(),
		amount in amount_strategy(),
		block in 0u64..100_000_000,
		chain in chain_strategy(),
	) {
		let schema = schema(contract);
		let result = CallResultBuilder::new()
			.query_name("amounts")
			.chain(chain)
			.contract_address(contract)
			.block_number(block)
			.output("amount", amount)
			.build();

		let outcome = RuntimeEvaluator::new(Arc::new(BlockEcho))
			.evaluate(&schema, &result)
			.unwrap();

		if amount * 2 >= 1000 {
			let output = outcome.into_output().unwrap();
			prop_assert_eq!(&output["doubled"], &Value::Number((amount * 2) as f64));
			prop_assert_eq!(&output["held"], &Value::Number(block as f64));
			prop_assert_eq!(&output["chain"], &Value::from(chain.as_str()));
		} else {
			prop_assert_eq!(outcome, Outcome::Filtered);
		}
	}

	#[test]
	fn test_evaluations_are_independent(
		contract in address_strategy(),
		amounts in prop::collection::vec(amount_strategy(), 1..6),
	) {
		let schema = schema(contract);
		let evaluator = RuntimeEvaluator::new(Arc::new(BlockEcho));

		let results: Vec<_> = amounts
			.iter()
			.map(|amount| {
				CallResultBuilder::new()
					.query_name("amounts")
					.contract_address(contract)
					.output("amount", *amount)
					.build()
			})
			.collect();

		let first: Vec<_> = results
			.iter()
			.map(|result| evaluator.evaluate(&schema, result).unwrap())
			.collect();
		let second: Vec<_> = results
			.iter()
			.rev()
			.map(|result| evaluator.evaluate(&schema, result).unwrap())
			.collect();

		prop_assert_eq!(first.len(), second.len());
		for (a, b) in first.iter().zip(second.iter().rev()) {
			prop_assert_eq!(a, b);
		}
		prop_assert!(schema.queries[0].context.var("doubled").is_none());
		prop_assert!(schema.queries[0].context.var("amount").is_none());
	}
}
