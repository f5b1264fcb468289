use std::{fmt::Display, io::Write, rc::Rc};

use crate::{
	environment::Scope,
	error::interpreter::RuntimeFault,
	interpreter::{callable::Callable, value::Value},
	utils::RcCell,
};

/// A host-created object. It owns a field scope and a method table; there is
/// no syntax for creating objects in the language itself.
#[derive(Debug)]
pub struct Object {
	pub type_name: String,
	members:       Scope<RcCell<Value>, Rc<Callable>>,
}

impl Object {
	pub fn new(type_name: impl Into<String>) -> Self { Self { type_name: type_name.into(), members: Scope::default() } }

	pub fn define_field(&mut self, name: &str, value: Value) { self.members.define_variable(name, RcCell::new(value)) }

	/// Defines a method taking `arity` arguments besides the receiver, which is
	/// passed first.
	pub fn define_method(
		&mut self,
		name: &str,
		arity: usize,
		function: impl Fn(&mut dyn Write, &[Value]) -> Result<Value, RuntimeFault> + 'static,
	) {
		self.members.define_function(name, arity + 1, Rc::new(Callable::native(name, arity + 1, function)));
	}

	pub fn field(&self, name: &str) -> Result<RcCell<Value>, RuntimeFault> {
		self.members.variable(name).cloned().ok_or_else(|| RuntimeFault::UndefinedField(name.to_string()))
	}

	/// Looks up a method by the number of arguments besides the receiver.
	pub fn method(&self, name: &str, arity: usize) -> Result<Rc<Callable>, RuntimeFault> {
		self.members
			.function(name, arity + 1)
			.cloned()
			.ok_or_else(|| RuntimeFault::UndefinedMethod { name: name.to_string(), arity })
	}
}

impl Display for Object {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut fields = self.members.variables().map(|(name, value)| format!("{name}={}", value.borrow())).collect::<Vec<_>>();
		fields.sort();
		write!(f, "{}{{{}}}", self.type_name, fields.join(", "))
	}
}
