//! Interface descriptor hydration.
//!
//! Reads the JSON ABI files referenced by contracts and events, relative to the
//! configuration directory, and attaches the parsed descriptors to the schema tree.

use alloy::json_abi::JsonAbi;
use std::{
	collections::HashMap,
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};
use tracing::debug;

use crate::models::{config::error::ConfigError, Query};

/// Loads and caches interface descriptors for one schema load
pub struct InterfaceHydrator {
	config_dir: PathBuf,
	cache: HashMap<PathBuf, Arc<JsonAbi>>,
}

impl InterfaceHydrator {
	pub fn new(config_dir: impl Into<PathBuf>) -> Self {
		Self {
			config_dir: config_dir.into(),
			cache: HashMap::new(),
		}
	}

	/// Loads the descriptor at `relative_path`, reading each file at most once
	pub fn load(&mut self, relative_path: &str) -> Result<Arc<JsonAbi>, ConfigError> {
		let path = self.config_dir.join(relative_path);
		if let Some(abi) = self.cache.get(&path) {
			return Ok(abi.clone());
		}

		let abi = Arc::new(read_abi(&path)?);
		debug!(path = %path.display(), "loaded interface descriptor");
		self.cache.insert(path, abi.clone());
		Ok(abi)
	}

	/// Attaches descriptors to every contract and event of `query`.
	///
	/// Contract events without their own `abi` use the contract's descriptor.
	pub fn hydrate(&mut self, query: &mut Query) -> Result<(), ConfigError> {
		for contract in &mut query.contracts {
			let abi = self.load(&contract.abi_path)?;
			for event in &mut contract.events {
				event.abi = Some(match &event.abi_path {
					Some(path) => self.load(path)?,
					None => abi.clone(),
				});
			}
			contract.abi = Some(abi);
		}

		for event in &mut query.events {
			let path = event.abi_path.as_deref().ok_or_else(|| {
				ConfigError::interface_load_error(
					"",
					format!("global event `{}` has no interface descriptor", event.name),
				)
			})?;
			event.abi = Some(self.load(path)?);
		}

		Ok(())
	}
}

fn read_abi(path: &Path) -> Result<JsonAbi, ConfigError> {
	let source = fs::read_to_string(path).map_err(|e| {
		ConfigError::interface_load_error(path.display().to_string(), e.to_string())
	})?;
	serde_json::from_str(&source).map_err(|e| {
		ConfigError::interface_load_error(path.display().to_string(), e.to_string())
	})
}
