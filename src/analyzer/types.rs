use std::{collections::HashMap, fmt};

use crate::environment::Scope;

/// Static types. `Named` types are registered by the host through [`TypeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
	Nil,
	Boolean,
	Integer,
	Decimal,
	Character,
	String,
	/// Operand type of the comparison operators.
	Comparable,
	/// Accepts a value of any type, e.g. the parameter of `print`.
	Any,
	/// What a `FOR` loop iterates over.
	IntegerIterable,
	Named(String),
}

impl Type {
	pub fn is_numeric(&self) -> bool { matches!(self, Type::Integer | Type::Decimal) }

	/// Whether a value of type `source` may be stored where `self` is expected.
	/// There is no numeric widening.
	pub fn accepts(&self, source: &Type) -> bool { self == source || matches!(self, Type::Any | Type::Comparable) }

	fn builtin(name: &str) -> Option<Self> {
		Some(match name {
			"Nil" => Type::Nil,
			"Boolean" => Type::Boolean,
			"Integer" => Type::Integer,
			"Decimal" => Type::Decimal,
			"Character" => Type::Character,
			"String" => Type::String,
			"Comparable" => Type::Comparable,
			"Any" => Type::Any,
			"IntegerIterable" => Type::IntegerIterable,
			_ => return None,
		})
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Type::Nil => write!(f, "Nil"),
			Type::Boolean => write!(f, "Boolean"),
			Type::Integer => write!(f, "Integer"),
			Type::Decimal => write!(f, "Decimal"),
			Type::Character => write!(f, "Character"),
			Type::String => write!(f, "String"),
			Type::Comparable => write!(f, "Comparable"),
			Type::Any => write!(f, "Any"),
			Type::IntegerIterable => write!(f, "IntegerIterable"),
			Type::Named(name) => write!(f, "{name}"),
		}
	}
}

/// A resolved variable binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
	pub name: String,
	pub ty:   Type,
}

impl Variable {
	pub fn new(name: impl Into<String>, ty: Type) -> Self { Self { name: name.into(), ty } }
}

/// A resolved function signature. Member methods list the receiver as their
/// first parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
	pub name:            String,
	pub parameter_types: Vec<Type>,
	pub return_type:     Type,
}

impl Function {
	pub fn new(name: impl Into<String>, parameter_types: Vec<Type>, return_type: Type) -> Self {
		Self { name: name.into(), parameter_types, return_type }
	}
}

/// Fields and methods of a type, resolved for dotted access.
pub type Members = Scope<Variable, Function>;

/// Resolves type names. Builtin types have no members.
#[derive(Debug, Default)]
pub struct TypeRegistry {
	named: HashMap<String, Members>,
}

impl TypeRegistry {
	pub fn new() -> Self { Self::default() }

	/// Registers a named type, or reopens an existing one, and returns its members
	/// for the host to fill.
	pub fn register(&mut self, name: impl Into<String>) -> &mut Members { self.named.entry(name.into()).or_default() }

	pub fn resolve(&self, name: &str) -> Option<Type> {
		Type::builtin(name).or_else(|| self.named.contains_key(name).then(|| Type::Named(name.to_string())))
	}

	pub fn members(&self, ty: &Type) -> Option<&Members> {
		match ty {
			Type::Named(name) => self.named.get(name),
			_ => None,
		}
	}
}
