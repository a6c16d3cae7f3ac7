use crate::properties::strategies::{address_items_strategy, scalar_value_strategy};
use chainquery::{
	models::{expand_loop, LoopTemplate},
	services::expression::{builtin_context, Value},
};
use proptest::{prelude::*, test_runner::Config};

const TEMPLATE: &str = r#"
loop {
	items = []

	query "holdings" {
		chain = "ethereum"

		contract {
			address = item
			abi = "erc20.json"

			method "totalSupply" {
				outputs = ["supply"]
			}
		}

		save {
			supply = supply
		}
	}

	query "tagged" {
		chain = "polygon"
		save {}
	}
}
"#;

fn template() -> LoopTemplate {
	let body = hcl::parse(TEMPLATE).unwrap();
	let block = body.into_blocks().next().unwrap();
	LoopTemplate::decode(&block, &builtin_context()).unwrap()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_each_item_yields_every_template(items in address_items_strategy()) {
		let values: Vec<Value> = items.iter().map(|item| Value::from(item.as_str())).collect();
		let queries = expand_loop(&template().queries, &values).unwrap();

		prop_assert_eq!(queries.len(), items.len() * 2);
		for (index, item) in items.iter().enumerate() {
			let holdings = &queries[index * 2];
			let tagged = &queries[index * 2 + 1];

			prop_assert_eq!(holdings.name.as_str(), "holdings");
			prop_assert!(holdings.contracts[0].matches(item));
			prop_assert_eq!(tagged.name.as_str(), "tagged");
			prop_assert_eq!(holdings.context.var("item"), Some(&values[index]));
			prop_assert_eq!(tagged.context.var("item"), Some(&values[index]));
		}
	}

	#[test]
	fn test_loop_contexts_hold_only_the_item(
		items in prop::collection::vec(scalar_value_strategy(), 0..6)
	) {
		let body = hcl::parse(r#"query "q" {
			chain = "arbitrum"
			save {
				value = item
			}
		}"#).unwrap();
		let blocks: Vec<_> = body.into_blocks().collect();
		let queries = expand_loop(&blocks, &items).unwrap();

		prop_assert_eq!(queries.len(), items.len());
		for (query, item) in queries.iter().zip(&items) {
			prop_assert_eq!(query.context.var_names(), vec!["item".to_string()]);
			prop_assert_eq!(query.context.var("item"), Some(item));
			prop_assert!(query.context.var("now").is_none());
		}
	}
}
