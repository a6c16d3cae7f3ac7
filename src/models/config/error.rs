//! Configuration error types.
//!
//! This module defines the error types that can occur while loading a schema
//! and validating it.

use log::error;
use std::{error::Error, fmt};
use thiserror::Error as ThisError;

/// Interval and window consistency violations
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	#[error("query `{query}` calls methods in realtime mode without an interval")]
	NoIntervalRealtime { query: String },

	#[error("query `{query}` calls methods over a historical window without an interval")]
	NoIntervalHistorical { query: String },

	#[error("query `{query}` reads historical events but defines an interval")]
	IntervalDefinedForHistoricalEvents { query: String },
}

/// Errors that can occur during schema loading
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
	/// Schema file is missing or unreadable
	ReadError(String),

	/// Schema text is not valid HCL
	SyntaxError(String),

	/// Schema structure or an expression in it could not be decoded
	DecodeError(String),

	/// Interface descriptor could not be read or parsed
	InterfaceLoadError { path: String, message: String },

	/// Loaded schema violates a run invariant
	ValidationError(ValidationError),
}

impl ConfigError {
	/// Format the error message for display
	fn format_message(&self) -> String {
		match self {
			Self::ReadError(msg) => format!("Read error: {}", msg),
			Self::SyntaxError(msg) => format!("Syntax error: {}", msg),
			Self::DecodeError(msg) => format!("Decode error: {}", msg),
			Self::InterfaceLoadError { path, message } => {
				format!("Interface load error: {}: {}", path, message)
			}
			Self::ValidationError(err) => format!("Validation error: {}", err),
		}
	}

	/// Create a new read error and log it
	pub fn read_error(msg: impl Into<String>) -> Self {
		let error = Self::ReadError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new syntax error and log it
	pub fn syntax_error(msg: impl Into<String>) -> Self {
		let error = Self::SyntaxError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new decode error and log it
	pub fn decode_error(msg: impl Into<String>) -> Self {
		let error = Self::DecodeError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new interface load error and log it
	pub fn interface_load_error(path: impl Into<String>, msg: impl Into<String>) -> Self {
		let error = Self::InterfaceLoadError {
			path: path.into(),
			message: msg.into(),
		};
		error!("{}", error.format_message());
		error
	}

	/// Create a new validation error and log it
	pub fn validation_error(err: ValidationError) -> Self {
		let error = Self::ValidationError(err);
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ConfigError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::ValidationError(err) => Some(err),
			_ => None,
		}
	}
}

impl From<hcl::Error> for ConfigError {
	fn from(err: hcl::Error) -> Self {
		Self::syntax_error(err.to_string())
	}
}

impl From<ValidationError> for ConfigError {
	fn from(err: ValidationError) -> Self {
		Self::validation_error(err)
	}
}
