//! Schema checker entry point.
//!
//! Loads `schema.hcl` from a configuration directory, hydrates its interface
//! descriptors, validates it for the requested run mode and logs a summary of the
//! resulting queries. Results are produced and evaluated by the host executor, not
//! by this binary.
//!
//! # Flow
//! 1. Loads `.env` and sets up logging
//! 2. Loads the schema from `--config-dir` (or `CHAINQUERY_CONFIG_DIR`)
//! 3. Validates it for historical or `--realtime` runs
//! 4. Logs one line per query

use anyhow::Context;
use chainquery::{
	models::{ConfigLoader, RunOptions, Schema},
	utils::logging::setup_logging,
};
use clap::{Arg, Command};
use dotenvy::dotenv;
use std::{env::var, path::PathBuf};
use tracing::{error, info, instrument};

const DEFAULT_CONFIG_DIR: &str = "config";

#[instrument(skip_all, fields(config_dir = %config_dir.display()))]
fn check_schema(config_dir: PathBuf, options: RunOptions) -> anyhow::Result<Schema> {
	let schema = Schema::load_from_path(&config_dir)
		.with_context(|| format!("failed to load schema from {}", config_dir.display()))?;
	schema
		.validate(&options)
		.context("schema is not valid for this run mode")?;
	Ok(schema)
}

fn log_summary(schema: &Schema) {
	for query in &schema.queries {
		let window = query.effective_window(&schema.window);
		info!(
			query = %query.name,
			chain = %query.chain,
			contracts = query.contracts.len(),
			global_events = query.events.len(),
			methods = query.has_contract_methods(),
			contract_events = query.has_contract_events(),
			filtered = query.filter.is_some(),
			start_block = ?window.start_block,
			end_block = ?window.end_block,
			block_interval = ?window.block_interval,
			time_interval = ?window.time_interval,
			"query ready"
		);
	}
}

fn main() -> anyhow::Result<()> {
	let matches = Command::new("chainquery")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Loads and validates a declarative on-chain query schema")
		.arg(
			Arg::new("config-dir")
				.long("config-dir")
				.help("Directory containing schema.hcl and the ABI files (default: config)")
				.value_name("DIR"),
		)
		.arg(
			Arg::new("realtime")
				.long("realtime")
				.help("Validate for realtime instead of historical runs")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("verbose")
				.long("verbose")
				.short('v')
				.help("Enable debug logging of the loader")
				.action(clap::ArgAction::SetTrue),
		)
		.get_matches();

	dotenv().ok();

	setup_logging(matches.get_flag("verbose")).unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_dir = matches
		.get_one::<String>("config-dir")
		.cloned()
		.or_else(|| var("CHAINQUERY_CONFIG_DIR").ok())
		.unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());
	let options = RunOptions {
		realtime: matches.get_flag("realtime"),
	};

	match check_schema(PathBuf::from(config_dir), options) {
		Ok(schema) => {
			log_summary(&schema);
			info!(
				queries = schema.queries.len(),
				realtime = options.realtime,
				"schema is valid"
			);
			Ok(())
		}
		Err(e) => {
			error!("{:#}", e);
			Err(e)
		}
	}
}
