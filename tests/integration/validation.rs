//! Run-mode validation of loaded schemas.

use crate::integration::mocks::{ConfigDir, USDC};
use chainquery::models::{ConfigError, ConfigLoader, RunOptions, ValidationError};

const REALTIME: RunOptions = RunOptions { realtime: true };
const HISTORICAL: RunOptions = RunOptions { realtime: false };

fn method_schema(header: &str) -> String {
	format!(
		r#"
		{header}

		query "supply" {{
			chain = "ethereum"
			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"
				method "totalSupply" {{
					outputs = ["supply"]
				}}
			}}
			save {{
				supply = supply
			}}
		}}
		"#
	)
}

fn event_schema(header: &str) -> String {
	format!(
		r#"
		{header}

		query "transfers" {{
			chain = "ethereum"
			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"
				event "Transfer" {{
					outputs = ["value"]
				}}
			}}
			save {{
				value = value
			}}
		}}
		"#
	)
}

fn validate(source: &str, options: RunOptions) -> Result<(), ConfigError> {
	ConfigDir::with_schema(source).load().unwrap().validate(&options)
}

#[test]
fn test_realtime_methods_without_interval() {
	let result = validate(&method_schema(""), REALTIME);
	assert!(matches!(
		result,
		Err(ConfigError::ValidationError(
			ValidationError::NoIntervalRealtime { .. }
		))
	));
}

#[test]
fn test_realtime_methods_with_block_interval() {
	assert!(validate(&method_schema("block_interval = 5"), REALTIME).is_ok());
}

#[test]
fn test_historical_methods_without_interval() {
	let result = validate(
		&method_schema("start_time = 1690000000\nend_time = 1690086400"),
		HISTORICAL,
	);
	assert!(matches!(
		result,
		Err(ConfigError::ValidationError(
			ValidationError::NoIntervalHistorical { .. }
		))
	));
}

#[test]
fn test_historical_events_with_interval() {
	let result = validate(&event_schema("time_interval = 3600"), HISTORICAL);
	assert!(matches!(
		result,
		Err(ConfigError::ValidationError(
			ValidationError::IntervalDefinedForHistoricalEvents { .. }
		))
	));
}

#[test]
fn test_realtime_events_with_interval() {
	assert!(validate(&event_schema("time_interval = 3600"), REALTIME).is_ok());
}

#[test]
fn test_historical_events_without_interval() {
	assert!(validate(
		&event_schema("start_block = 100\nend_block = 200"),
		HISTORICAL
	)
	.is_ok());
}

#[test]
fn test_method_violation_reported_before_earlier_event_violation() {
	let source = format!(
		r#"
		query "a" {{
			chain = "arbitrum"
			time_interval = 60
			event "Swap" {{
				abi = "abis/pair.json"
				outputs = ["amount0In"]
			}}
			save {{
				amount = amount0In
			}}
		}}

		query "b" {{
			chain = "ethereum"
			start_block = 1
			end_block = 10
			contract {{
				address = "{USDC}"
				abi = "abis/erc20.json"
				method "totalSupply" {{
					outputs = ["supply"]
				}}
			}}
			save {{
				supply = supply
			}}
		}}
		"#
	);

	match validate(&source, HISTORICAL) {
		Err(ConfigError::ValidationError(ValidationError::NoIntervalHistorical { query })) => {
			assert_eq!(query, "b")
		}
		other => panic!("unexpected result: {:?}", other),
	}
}
