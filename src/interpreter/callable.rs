use std::{fmt::Debug, io::Write, rc::Rc};

use crate::{environment::ScopeId, error::interpreter::RuntimeFault, interpreter::value::Value, statement::Method};

/// A host function. It receives the interpreter's output stream and the evaluated arguments.
pub type NativeFunction = Box<dyn Fn(&mut dyn Write, &[Value]) -> Result<Value, RuntimeFault>>;

#[derive(Debug)]
pub struct Callable {
	pub name:  String,
	pub arity: usize,
	pub body:  CallableType,
}

pub enum CallableType {
	Native(NativeFunction),
	/// A `DEF` method, run in a child of the scope it was defined in.
	Declared { method: Rc<Method>, scope: ScopeId },
}

impl Debug for CallableType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Native(_) => f.debug_tuple("Native").field(&"Function Pointer").finish(),
			Self::Declared { method, scope } => {
				f.debug_struct("Declared").field("method", &method.name).field("scope", scope).finish()
			}
		}
	}
}

impl Callable {
	pub fn native(
		name: impl Into<String>,
		arity: usize,
		function: impl Fn(&mut dyn Write, &[Value]) -> Result<Value, RuntimeFault> + 'static,
	) -> Self {
		Self { name: name.into(), arity, body: CallableType::Native(Box::new(function)) }
	}

	pub fn declared(method: Rc<Method>, scope: ScopeId) -> Self {
		Self { name: method.name.clone(), arity: method.parameters.len(), body: CallableType::Declared { method, scope } }
	}
}
