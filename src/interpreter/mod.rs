//! Tree-walking interpreter.
//!
//! The interpreter walks a parsed (and normally analyzed) [`Source`],
//! evaluating expressions to runtime [`Value`]s. It relies on the runtime
//! kind of each value, not on the analyzer's static types, so every operation
//! checks its operands and reports a [`RuntimeFault`] on mismatch.
//!
//! Scoping follows the source: the root scope holds `print`, the fields and
//! the methods; each invocation, loop iteration and `IF` branch runs in a
//! fresh child scope that is popped when it finishes.
//!
//! Evaluation recurses on the host stack. Deep user recursion or deeply
//! nested expressions overflow it; there is no depth limit.

pub mod callable;
pub mod instance;
pub mod value;

use std::{
	cmp::Ordering,
	io::{Stdout, Write},
	rc::Rc,
};

use callable::{Callable, CallableType};
use value::Value;

use crate::{
	environment::{ScopeId, Scopes},
	error::interpreter::RuntimeFault,
	parser::expression::{BinaryOperator, Expr, ExprKind},
	statement::{Method, Source, Stmt},
	utils::RcCell,
};

/// How a statement finished.
#[derive(Debug, PartialEq)]
pub enum ExecResult {
	Continue,
	Return(Value),
}

pub struct Interpreter<W: Write = Stdout> {
	scopes: Scopes<RcCell<Value>, Rc<Callable>>,
	/// Where `print` writes.
	output: W,
}

impl Default for Interpreter {
	fn default() -> Self { Self::new() }
}

impl Interpreter {
	/// An interpreter printing to stdout.
	pub fn new() -> Self { Self::with_output(std::io::stdout()) }
}

impl<W: Write> Interpreter<W> {
	pub fn with_output(output: W) -> Self {
		let mut interpreter = Self { scopes: Scopes::new(), output };
		interpreter.define_function("print", 1, |output, arguments| {
			for argument in arguments {
				writeln!(output, "{argument}")?;
			}
			Ok(Value::Nil)
		});
		interpreter
	}

	pub fn output(&self) -> &W { &self.output }

	pub fn into_output(self) -> W { self.output }

	/// Defines a host variable in the root scope.
	pub fn define_variable(&mut self, name: &str, value: Value) {
		let root = self.scopes.root();
		self.scopes.define_variable(root, name, RcCell::new(value));
	}

	/// Defines a host function in the root scope.
	pub fn define_function(
		&mut self,
		name: &str,
		arity: usize,
		function: impl Fn(&mut dyn Write, &[Value]) -> Result<Value, RuntimeFault> + 'static,
	) {
		let root = self.scopes.root();
		self.scopes.define_function(root, name, arity, Rc::new(Callable::native(name, arity, function)));
	}

	/// Defines the fields and methods, then calls `main()` and returns its value.
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn interpret(&mut self, source: &Source) -> Result<Value, RuntimeFault> {
		let root = self.scopes.root();
		for field in &source.fields {
			let value = match &field.value {
				Some(value) => self.evaluate(value, root)?,
				None => Value::Nil,
			};
			self.scopes.define_variable(root, &field.name, RcCell::new(value));
		}
		for method in &source.methods {
			self.define_method(method, root);
		}
		let main = self.scopes.lookup_function(root, "main", 0).cloned().ok_or(RuntimeFault::MissingMain)?;
		let result = self.call(&main, Vec::new())?;
		self.output.flush()?;
		tracing::debug!(%result, "main returned");
		Ok(result)
	}

	fn define_method(&mut self, method: &Method, scope: ScopeId) {
		let callable = Callable::declared(Rc::new(method.clone()), scope);
		self.scopes.define_function(scope, &method.name, callable.arity, Rc::new(callable));
	}

	fn call(&mut self, callable: &Callable, arguments: Vec<Value>) -> Result<Value, RuntimeFault> {
		match &callable.body {
			CallableType::Native(function) => {
				let output: &mut dyn Write = &mut self.output;
				function(output, arguments.as_slice())
			}
			CallableType::Declared { method, scope } => {
				tracing::trace!(name = callable.name, "invoke");
				let body = self.scopes.push(*scope);
				for (parameter, argument) in method.parameters.iter().zip(arguments) {
					self.scopes.define_variable(body, &parameter.name, RcCell::new(argument));
				}
				let result = self.statements(&method.statements, body);
				self.scopes.pop(body);
				Ok(match result? {
					ExecResult::Return(value) => value,
					ExecResult::Continue => Value::Nil,
				})
			}
		}
	}

	fn statements(&mut self, statements: &[Stmt], scope: ScopeId) -> Result<ExecResult, RuntimeFault> {
		for statement in statements {
			if let ExecResult::Return(value) = self.execute(statement, scope)? {
				return Ok(ExecResult::Return(value));
			}
		}
		Ok(ExecResult::Continue)
	}

	/// Runs `statements` in a fresh child of `parent`, optionally binding one variable first.
	fn block(
		&mut self,
		statements: &[Stmt],
		parent: ScopeId,
		bind: Option<(&str, Value)>,
	) -> Result<ExecResult, RuntimeFault> {
		let scope = self.scopes.push(parent);
		if let Some((name, value)) = bind {
			self.scopes.define_variable(scope, name, RcCell::new(value));
		}
		let result = self.statements(statements, scope);
		self.scopes.pop(scope);
		result
	}

	fn execute(&mut self, statement: &Stmt, scope: ScopeId) -> Result<ExecResult, RuntimeFault> {
		match statement {
			Stmt::Expression(expr) => {
				self.evaluate(expr, scope)?;
			}
			Stmt::Declaration { name, value, .. } => {
				let value = match value {
					Some(value) => self.evaluate(value, scope)?,
					None => Value::Nil,
				};
				self.scopes.define_variable(scope, name, RcCell::new(value));
			}
			Stmt::Assignment { receiver, value } => self.assign(receiver, value, scope)?,
			Stmt::If { condition, then_statements, else_statements } => {
				let branch = if self.evaluate(condition, scope)?.as_boolean("IF")? {
					then_statements
				} else {
					else_statements
				};
				return self.block(branch, scope, None);
			}
			Stmt::For { name, value, statements } => {
				let values = match self.evaluate(value, scope)? {
					Value::Iterable(values) => values,
					other => return Err(value::mismatch("FOR", "IntegerIterable", other.kind())),
				};
				for value in values.iter() {
					if let ExecResult::Return(value) = self.block(statements, scope, Some((name.as_str(), value.clone())))? {
						return Ok(ExecResult::Return(value));
					}
				}
			}
			Stmt::While { condition, statements } => {
				while self.evaluate(condition, scope)?.as_boolean("WHILE")? {
					if let ExecResult::Return(value) = self.block(statements, scope, None)? {
						return Ok(ExecResult::Return(value));
					}
				}
			}
			Stmt::Return(value) => return Ok(ExecResult::Return(self.evaluate(value, scope)?)),
		}
		Ok(ExecResult::Continue)
	}

	fn assign(&mut self, receiver: &Expr, value: &Expr, scope: ScopeId) -> Result<(), RuntimeFault> {
		let ExprKind::Access { receiver: object, name, .. } = &receiver.kind else {
			return Err(RuntimeFault::InvalidAssignmentTarget);
		};
		let cell = match object {
			Some(object) => match self.evaluate(object, scope)? {
				Value::Object(object) => object.borrow().field(name)?,
				other => return Err(value::mismatch("field assignment", "an object", other.kind())),
			},
			None => self.variable(name, scope)?,
		};
		let value = self.evaluate(value, scope)?;
		*cell.borrow_mut() = value;
		Ok(())
	}

	fn variable(&self, name: &str, scope: ScopeId) -> Result<RcCell<Value>, RuntimeFault> {
		self.scopes.lookup_variable(scope, name).cloned().ok_or_else(|| RuntimeFault::UndefinedVariable(name.to_string()))
	}

	/// Evaluate the given expression and return its value.
	fn evaluate(&mut self, expr: &Expr, scope: ScopeId) -> Result<Value, RuntimeFault> {
		Ok(match &expr.kind {
			ExprKind::Literal(literal) => Value::from(literal),
			ExprKind::Group(inner) => self.evaluate(inner, scope)?,
			ExprKind::Binary { operator, left, right } => self.binary(*operator, left, right, scope)?,
			ExprKind::Access { receiver: Some(receiver), name, .. } => match self.evaluate(receiver, scope)? {
				Value::Object(object) => object.borrow().field(name)?.borrow().clone(),
				other => return Err(value::mismatch("field access", "an object", other.kind())),
			},
			ExprKind::Access { receiver: None, name, .. } => self.variable(name, scope)?.borrow().clone(),
			ExprKind::Function { receiver, name, arguments, .. } => {
				let mut values =
					arguments.iter().map(|argument| self.evaluate(argument, scope)).collect::<Result<Vec<_>, _>>()?;
				match receiver {
					Some(receiver) => {
						let receiver = self.evaluate(receiver, scope)?;
						let Value::Object(object) = &receiver else {
							return Err(value::mismatch("method call", "an object", receiver.kind()));
						};
						let method = object.borrow().method(name, values.len())?;
						values.insert(0, receiver);
						self.call(&method, values)?
					}
					None => {
						let function = self.scopes.lookup_function(scope, name, values.len()).cloned().ok_or_else(|| {
							RuntimeFault::UndefinedFunction { name: name.clone(), arity: values.len() }
						})?;
						self.call(&function, values)?
					}
				}
			}
		})
	}

	fn binary(&mut self, operator: BinaryOperator, left: &Expr, right: &Expr, scope: ScopeId) -> Result<Value, RuntimeFault> {
		use BinaryOperator::*;
		let symbol = operator.symbol();
		let left = self.evaluate(left, scope)?;
		// OR stops at a true left operand and otherwise only checks the right,
		// AND always evaluates and checks both sides
		if operator == Or && matches!(left, Value::Boolean(true)) {
			return Ok(Value::Boolean(true));
		}
		let right = self.evaluate(right, scope)?;
		Ok(match operator {
			And => Value::Boolean(left.as_boolean(symbol)? & right.as_boolean(symbol)?),
			Or => Value::Boolean(right.as_boolean(symbol)?),
			Equal => Value::Boolean(left == right),
			NotEqual => Value::Boolean(left != right),
			Less => Value::Boolean(left.compare(&right, symbol)? == Ordering::Less),
			LessEqual => Value::Boolean(left.compare(&right, symbol)? != Ordering::Greater),
			Greater => Value::Boolean(left.compare(&right, symbol)? == Ordering::Greater),
			GreaterEqual => Value::Boolean(left.compare(&right, symbol)? != Ordering::Less),
			Add => left.add(&right)?,
			Subtract => left.subtract(&right)?,
			Multiply => left.multiply(&right)?,
			Divide => left.divide(&right)?,
		})
	}
}
