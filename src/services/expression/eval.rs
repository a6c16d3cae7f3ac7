//! Evaluation of HCL expression trees against an [`EvalContext`].

use std::collections::HashMap;

use hcl::{
	expr::{
		BinaryOperator, Conditional, Expression, ForExpr, FuncCall, ObjectKey, Operation,
		TemplateExpr, Traversal, TraversalOperator, UnaryOperator,
	},
	template::{Element, Template},
};
use indexmap::IndexMap;

use crate::services::expression::{EvalContext, ExpressionError, Value};

/// Evaluates `expr` against `context`
pub fn evaluate(expr: &Expression, context: &EvalContext) -> Result<Value, ExpressionError> {
	Evaluator::new(context).eval(expr)
}

struct Evaluator<'a> {
	context: &'a EvalContext,
	/// Variables bound by enclosing `for` expressions, innermost last
	locals: Vec<HashMap<String, Value>>,
}

impl<'a> Evaluator<'a> {
	fn new(context: &'a EvalContext) -> Self {
		Self {
			context,
			locals: Vec::new(),
		}
	}

	fn lookup(&self, name: &str) -> Result<Value, ExpressionError> {
		for frame in self.locals.iter().rev() {
			if let Some(value) = frame.get(name) {
				return Ok(value.clone());
			}
		}
		self.context
			.var(name)
			.cloned()
			.ok_or_else(|| ExpressionError::UnknownVariable(name.to_string()))
	}

	fn eval(&mut self, expr: &Expression) -> Result<Value, ExpressionError> {
		match expr {
			Expression::Null => Err(ExpressionError::Unsupported(
				"null values are not supported".to_string(),
			)),
			Expression::Bool(b) => Ok(Value::Bool(*b)),
			Expression::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
				ExpressionError::InvalidOperation(format!("number {} is out of range", n))
			}),
			Expression::String(s) => Ok(Value::String(s.clone())),
			Expression::Array(items) => items
				.iter()
				.map(|item| self.eval(item))
				.collect::<Result<Vec<_>, _>>()
				.map(Value::List),
			Expression::Object(object) => {
				let mut entries = IndexMap::new();
				for (key, value) in object.iter() {
					let key = self.object_key(key)?;
					let value = self.eval(value)?;
					entries.insert(key, value);
				}
				Ok(Value::Map(entries))
			}
			Expression::TemplateExpr(template) => self.eval_template(template),
			Expression::Variable(variable) => self.lookup(variable.as_str()),
			Expression::Traversal(traversal) => self.eval_traversal(traversal),
			Expression::FuncCall(call) => self.eval_func_call(call),
			Expression::Parenthesis(inner) => self.eval(inner),
			Expression::Conditional(conditional) => self.eval_conditional(conditional),
			Expression::Operation(operation) => self.eval_operation(operation),
			Expression::ForExpr(for_expr) => self.eval_for(for_expr),
			#[allow(unreachable_patterns)]
			_ => Err(ExpressionError::Unsupported(format!("{:?}", expr))),
		}
	}

	fn eval_bool(&mut self, expr: &Expression) -> Result<bool, ExpressionError> {
		match self.eval(expr)? {
			Value::Bool(b) => Ok(b),
			other => Err(ExpressionError::type_mismatch("bool", other.type_name())),
		}
	}

	/// Bare identifiers used as object keys are literal names
	fn object_key(&mut self, key: &ObjectKey) -> Result<String, ExpressionError> {
		match key {
			ObjectKey::Identifier(ident) => Ok(ident.to_string()),
			ObjectKey::Expression(Expression::Variable(variable)) => {
				Ok(variable.as_str().to_string())
			}
			ObjectKey::Expression(expr) => key_string(self.eval(expr)?),
			#[allow(unreachable_patterns)]
			_ => Err(ExpressionError::Unsupported("object key".to_string())),
		}
	}

	fn eval_template(&mut self, expr: &TemplateExpr) -> Result<Value, ExpressionError> {
		let template = Template::from_expr(expr)
			.map_err(|e| ExpressionError::InvalidOperation(format!("invalid template: {}", e)))?;
		let elements = template.elements();

		// "${x}" yields x unconverted
		if let [Element::Interpolation(interpolation)] = elements {
			return self.eval(&interpolation.expr);
		}

		let mut rendered = String::new();
		for element in elements {
			match element {
				Element::Literal(literal) => rendered.push_str(literal),
				Element::Interpolation(interpolation) => match self.eval(&interpolation.expr)? {
					value @ (Value::List(_) | Value::Map(_)) => {
						return Err(ExpressionError::type_mismatch("string", value.type_name()))
					}
					value => rendered.push_str(&value.to_string()),
				},
				#[allow(unreachable_patterns)]
				_ => {
					return Err(ExpressionError::Unsupported(
						"template directives are not supported".to_string(),
					))
				}
			}
		}
		Ok(Value::String(rendered))
	}

	fn eval_traversal(&mut self, traversal: &Traversal) -> Result<Value, ExpressionError> {
		let mut value = self.eval(&traversal.expr)?;
		for operator in &traversal.operators {
			value = match operator {
				TraversalOperator::GetAttr(name) => get_attr(value, name.as_str())?,
				TraversalOperator::Index(index) => {
					let index = self.eval(index)?;
					get_index(value, &index)?
				}
				TraversalOperator::LegacyIndex(index) => {
					get_index(value, &Value::Number(*index as f64))?
				}
				_ => {
					return Err(ExpressionError::Unsupported(
						"splat traversals are not supported".to_string(),
					))
				}
			};
		}
		Ok(value)
	}

	fn eval_func_call(&mut self, call: &FuncCall) -> Result<Value, ExpressionError> {
		let name = call.name.to_string();
		let function = self
			.context
			.func(&name)
			.cloned()
			.ok_or_else(|| ExpressionError::UnknownFunction(name.clone()))?;

		let mut args = call
			.args
			.iter()
			.map(|arg| self.eval(arg))
			.collect::<Result<Vec<_>, _>>()?;

		if call.expand_final {
			match args.pop() {
				Some(Value::List(items)) => args.extend(items),
				Some(other) => {
					return Err(ExpressionError::type_mismatch("list", other.type_name()))
				}
				None => {}
			}
		}

		function
			.call(&args)
			.map_err(|message| ExpressionError::FunctionCall { name, message })
	}

	fn eval_conditional(&mut self, conditional: &Conditional) -> Result<Value, ExpressionError> {
		if self.eval_bool(&conditional.cond_expr)? {
			self.eval(&conditional.true_expr)
		} else {
			self.eval(&conditional.false_expr)
		}
	}

	fn eval_operation(&mut self, operation: &Operation) -> Result<Value, ExpressionError> {
		match operation {
			Operation::Unary(unary) => {
				let value = self.eval(&unary.expr)?;
				match unary.operator {
					UnaryOperator::Not => match value {
						Value::Bool(b) => Ok(Value::Bool(!b)),
						other => Err(ExpressionError::type_mismatch("bool", other.type_name())),
					},
					UnaryOperator::Neg => Ok(Value::Number(-number_operand(&value)?)),
					#[allow(unreachable_patterns)]
					_ => Err(ExpressionError::Unsupported(format!("{:?}", unary.operator))),
				}
			}
			Operation::Binary(binary) => {
				self.eval_binary(&binary.operator, &binary.lhs_expr, &binary.rhs_expr)
			}
			#[allow(unreachable_patterns)]
			_ => Err(ExpressionError::Unsupported(format!("{:?}", operation))),
		}
	}

	fn eval_binary(
		&mut self,
		operator: &BinaryOperator,
		lhs: &Expression,
		rhs: &Expression,
	) -> Result<Value, ExpressionError> {
		match operator {
			BinaryOperator::And => {
				return Ok(Value::Bool(self.eval_bool(lhs)? && self.eval_bool(rhs)?));
			}
			BinaryOperator::Or => {
				return Ok(Value::Bool(self.eval_bool(lhs)? || self.eval_bool(rhs)?));
			}
			_ => {}
		}

		let lhs = self.eval(lhs)?;
		let rhs = self.eval(rhs)?;

		match operator {
			BinaryOperator::Eq => Ok(Value::Bool(lhs == rhs)),
			BinaryOperator::NotEq => Ok(Value::Bool(lhs != rhs)),
			_ => {
				let a = number_operand(&lhs)?;
				let b = number_operand(&rhs)?;
				match operator {
					BinaryOperator::Less => Ok(Value::Bool(a < b)),
					BinaryOperator::LessEq => Ok(Value::Bool(a <= b)),
					BinaryOperator::Greater => Ok(Value::Bool(a > b)),
					BinaryOperator::GreaterEq => Ok(Value::Bool(a >= b)),
					BinaryOperator::Plus => Ok(Value::Number(a + b)),
					BinaryOperator::Minus => Ok(Value::Number(a - b)),
					BinaryOperator::Mul => Ok(Value::Number(a * b)),
					BinaryOperator::Div | BinaryOperator::Mod if b == 0.0 => Err(
						ExpressionError::InvalidOperation("division by zero".to_string()),
					),
					BinaryOperator::Div => Ok(Value::Number(a / b)),
					BinaryOperator::Mod => Ok(Value::Number(a % b)),
					other => Err(ExpressionError::Unsupported(format!("{:?}", other))),
				}
			}
		}
	}

	fn eval_for(&mut self, for_expr: &ForExpr) -> Result<Value, ExpressionError> {
		let pairs: Vec<(Value, Value)> = match self.eval(&for_expr.collection_expr)? {
			Value::List(items) => items
				.into_iter()
				.enumerate()
				.map(|(i, item)| (Value::Number(i as f64), item))
				.collect(),
			Value::Map(entries) => entries
				.into_iter()
				.map(|(key, value)| (Value::String(key), value))
				.collect(),
			other => {
				return Err(ExpressionError::type_mismatch(
					"list or map",
					other.type_name(),
				))
			}
		};

		let mut list = Vec::new();
		let mut map = IndexMap::new();
		for (key, value) in pairs {
			let mut frame = HashMap::new();
			if let Some(key_var) = &for_expr.key_var {
				frame.insert(key_var.to_string(), key);
			}
			frame.insert(for_expr.value_var.to_string(), value);

			self.locals.push(frame);
			let result = self.eval_for_element(for_expr, &mut list, &mut map);
			self.locals.pop();
			result?;
		}

		if for_expr.key_expr.is_some() {
			Ok(Value::Map(map))
		} else {
			Ok(Value::List(list))
		}
	}

	fn eval_for_element(
		&mut self,
		for_expr: &ForExpr,
		list: &mut Vec<Value>,
		map: &mut IndexMap<String, Value>,
	) -> Result<(), ExpressionError> {
		if let Some(cond) = &for_expr.cond_expr {
			if !self.eval_bool(cond)? {
				return Ok(());
			}
		}

		let value = self.eval(&for_expr.value_expr)?;
		let Some(key_expr) = &for_expr.key_expr else {
			list.push(value);
			return Ok(());
		};

		let key = key_string(self.eval(key_expr)?)?;
		if for_expr.grouping {
			if let Value::List(group) = map
				.entry(key)
				.or_insert_with(|| Value::List(Vec::new()))
			{
				group.push(value);
			}
		} else if map.contains_key(&key) {
			return Err(ExpressionError::InvalidOperation(format!(
				"duplicate key `{}` in for expression",
				key
			)));
		} else {
			map.insert(key, value);
		}
		Ok(())
	}
}

fn key_string(value: Value) -> Result<String, ExpressionError> {
	match value {
		Value::String(s) => Ok(s),
		value @ Value::Number(_) => Ok(value.to_string()),
		other => Err(ExpressionError::type_mismatch("string", other.type_name())),
	}
}

fn number_operand(value: &Value) -> Result<f64, ExpressionError> {
	value
		.as_number()
		.ok_or_else(|| ExpressionError::type_mismatch("number", value.type_name()))
}

fn get_attr(value: Value, name: &str) -> Result<Value, ExpressionError> {
	match value {
		Value::Map(mut entries) => entries.swap_remove(name).ok_or_else(|| {
			ExpressionError::InvalidOperation(format!("map has no attribute `{}`", name))
		}),
		other => Err(ExpressionError::type_mismatch("map", other.type_name())),
	}
}

fn get_index(value: Value, index: &Value) -> Result<Value, ExpressionError> {
	match value {
		Value::List(mut items) => {
			let position = number_operand(index)?;
			if position < 0.0 || position.fract() != 0.0 || position as usize >= items.len() {
				return Err(ExpressionError::InvalidOperation(format!(
					"index {} out of range for list of length {}",
					index,
					items.len()
				)));
			}
			Ok(items.swap_remove(position as usize))
		}
		Value::Map(entries) => get_attr(Value::Map(entries), &key_string(index.clone())?),
		other => Err(ExpressionError::type_mismatch("list or map", other.type_name())),
	}
}
