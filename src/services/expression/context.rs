//! Evaluation contexts.
//!
//! A context is a variable table plus a function table. Contexts can be layered:
//! [`EvalContext::layered`] creates an empty overlay on top of a shared, immutable
//! parent. Lookups walk from the overlay down to the root, so declarations in the
//! overlay shadow the parent without ever modifying it.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
	services::expression::{functions::builtin_functions, Value},
	utils::clock::Clock,
};

type FunctionImpl = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// A function callable from schema expressions
#[derive(Clone)]
pub struct Function(Arc<FunctionImpl>);

impl Function {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
	{
		Self(Arc::new(f))
	}

	pub fn call(&self, args: &[Value]) -> Result<Value, String> {
		(self.0)(args)
	}
}

impl fmt::Debug for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Function")
	}
}

/// Variables and functions available to an expression
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
	variables: HashMap<String, Value>,
	functions: HashMap<String, Function>,
	parent: Option<Arc<EvalContext>>,
}

impl EvalContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty overlay on top of `parent`
	pub fn layered(parent: Arc<EvalContext>) -> Self {
		Self {
			variables: HashMap::new(),
			functions: HashMap::new(),
			parent: Some(parent),
		}
	}

	pub fn declare_var(&mut self, name: impl Into<String>, value: Value) {
		self.variables.insert(name.into(), value);
	}

	pub fn declare_func(&mut self, name: impl Into<String>, function: Function) {
		self.functions.insert(name.into(), function);
	}

	/// Declares every variable of `vars`, replacing existing declarations
	pub fn extend_vars<I>(&mut self, vars: I)
	where
		I: IntoIterator<Item = (String, Value)>,
	{
		self.variables.extend(vars);
	}

	pub fn extend_funcs<I>(&mut self, funcs: I)
	where
		I: IntoIterator<Item = (String, Function)>,
	{
		self.functions.extend(funcs);
	}

	pub fn var(&self, name: &str) -> Option<&Value> {
		match self.variables.get(name) {
			Some(value) => Some(value),
			None => self.parent.as_ref().and_then(|parent| parent.var(name)),
		}
	}

	pub fn func(&self, name: &str) -> Option<&Function> {
		match self.functions.get(name) {
			Some(function) => Some(function),
			None => self.parent.as_ref().and_then(|parent| parent.func(name)),
		}
	}

	/// All visible variable names, across layers
	pub fn var_names(&self) -> Vec<String> {
		let mut names = self
			.parent
			.as_ref()
			.map(|parent| parent.var_names())
			.unwrap_or_default();
		for name in self.variables.keys() {
			if !names.contains(name) {
				names.push(name.clone());
			}
		}
		names.sort();
		names
	}

	/// All visible function names, across layers
	pub fn func_names(&self) -> Vec<String> {
		let mut names = self
			.parent
			.as_ref()
			.map(|parent| parent.func_names())
			.unwrap_or_default();
		for name in self.functions.keys() {
			if !names.contains(name) {
				names.push(name.clone());
			}
		}
		names.sort();
		names
	}
}

/// Context with only the builtin functions and no variables
pub fn builtin_context() -> EvalContext {
	let mut context = EvalContext::new();
	context.extend_funcs(builtin_functions());
	context
}

/// Context available to every expression that appears before query data exists:
/// the builtin functions plus `now`, the current unix time in seconds.
pub fn initial_context(clock: &dyn Clock) -> EvalContext {
	let mut context = builtin_context();
	context.declare_var("now", Value::from(clock.now().timestamp()));
	context
}

/// Context for one loop iteration: the builtin functions plus `item`.
///
/// Schema variables and `now` are not visible.
pub fn loop_context(item: Value) -> EvalContext {
	let mut context = builtin_context();
	context.declare_var("item", item);
	context
}
