//! Evaluation error types and handling.
//!
//! Errors are scoped to the single result being evaluated; the schema is never
//! left modified by a failed evaluation.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors while evaluating a result
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
	/// A transform, filter or save body failed to decode
	DecodeError { block: String, message: String },
}

impl EvaluationError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::DecodeError { block, message } => {
				format!("Decode error in {}: {}", block, message)
			}
		}
	}

	/// Creates a new decode error with logging
	pub fn decode_error(block: impl Into<String>, msg: impl Into<String>) -> Self {
		let error = Self::DecodeError {
			block: block.into(),
			message: msg.into(),
		};
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for EvaluationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for EvaluationError {}
