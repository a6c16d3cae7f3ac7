use thiserror::Error;

/// Errors raised while evaluating a single expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
	#[error("unknown variable `{0}`")]
	UnknownVariable(String),

	#[error("unknown function `{0}`")]
	UnknownFunction(String),

	#[error("type mismatch: expected {expected}, found {found}")]
	TypeMismatch {
		expected: &'static str,
		found: &'static str,
	},

	#[error("call to `{name}` failed: {message}")]
	FunctionCall { name: String, message: String },

	#[error("unsupported expression: {0}")]
	Unsupported(String),

	#[error("invalid operation: {0}")]
	InvalidOperation(String),

	#[error("attribute `{name}`: {source}")]
	Attribute {
		name: String,
		source: Box<ExpressionError>,
	},
}

impl ExpressionError {
	pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
		Self::TypeMismatch { expected, found }
	}
}
