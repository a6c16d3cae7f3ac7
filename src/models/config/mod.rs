//! Schema configuration loading and validation.

use std::path::Path;

use crate::models::RunOptions;

mod decode;
mod error;
mod interface;
mod loop_expander;
mod schema_config;
mod validation;

pub use error::{ConfigError, ValidationError};
pub use interface::InterfaceHydrator;
pub use loop_expander::{expand, LoopTemplate};
pub use schema_config::SCHEMA_FILE;
pub use validation::validate;

/// Common interface for loading configuration
pub trait ConfigLoader: Sized {
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self, options: &RunOptions) -> Result<(), ConfigError>;
}
