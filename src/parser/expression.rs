//! Expression AST nodes
//!
//! An `Expr` is a tree structure representing code like `x + 1 * (y - 2)` as
//! nested nodes. The parser builds the shape; the analyzer later fills the
//! `ty` slot of every node and the binding slot of every access and call.

use std::fmt::{self, Display};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{analyzer, utils::plain_decimal};

/// An expression node with its source offset and, after analysis, its static type.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
	pub kind:   ExprKind,
	/// Byte offset of the token that starts the expression.
	pub offset: usize,
	/// Resolved static type, `None` until the analyzer has visited the node.
	pub ty:     Option<analyzer::Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
	Literal(Literal),
	Group(Box<Expr>),
	Binary {
		operator: BinaryOperator,
		left:     Box<Expr>,
		right:    Box<Expr>,
	},
	/// A variable, or a field when `receiver` is present.
	Access {
		receiver: Option<Box<Expr>>,
		name:     String,
		variable: Option<analyzer::Variable>,
	},
	/// A function call, or a method call when `receiver` is present.
	Function {
		receiver:  Option<Box<Expr>>,
		name:      String,
		arguments: Vec<Expr>,
		function:  Option<analyzer::Function>,
	},
}

impl Expr {
	pub fn new(kind: ExprKind, offset: usize) -> Self { Self { kind, offset, ty: None } }

	pub fn literal(literal: Literal, offset: usize) -> Self { Self::new(ExprKind::Literal(literal), offset) }

	pub fn group(inner: Expr, offset: usize) -> Self { Self::new(ExprKind::Group(Box::new(inner)), offset) }

	pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
		let offset = left.offset;
		Self::new(ExprKind::Binary { operator, left: Box::new(left), right: Box::new(right) }, offset)
	}

	pub fn access(receiver: Option<Expr>, name: impl Into<String>, offset: usize) -> Self {
		Self::new(ExprKind::Access { receiver: receiver.map(Box::new), name: name.into(), variable: None }, offset)
	}

	pub fn function(receiver: Option<Expr>, name: impl Into<String>, arguments: Vec<Expr>, offset: usize) -> Self {
		Self::new(
			ExprKind::Function { receiver: receiver.map(Box::new), name: name.into(), arguments, function: None },
			offset,
		)
	}
}

/// Literal values in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Nil,
	Boolean(bool),
	Integer(BigInt),
	Decimal(BigDecimal),
	Character(char),
	String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
	And,
	Or,
	Equal,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	Add,
	Subtract,
	Multiply,
	Divide,
}

impl BinaryOperator {
	pub const LOGICAL: [Self; 2] = [Self::And, Self::Or];
	pub const COMPARISON: [Self; 6] =
		[Self::Equal, Self::NotEqual, Self::Less, Self::LessEqual, Self::Greater, Self::GreaterEqual];
	pub const ADDITIVE: [Self; 2] = [Self::Add, Self::Subtract];
	pub const MULTIPLICATIVE: [Self; 2] = [Self::Multiply, Self::Divide];

	/// The source text of the operator.
	pub fn symbol(self) -> &'static str {
		use BinaryOperator::*;
		match self {
			And => "AND",
			Or => "OR",
			Equal => "==",
			NotEqual => "!=",
			Less => "<",
			LessEqual => "<=",
			Greater => ">",
			GreaterEqual => ">=",
			Add => "+",
			Subtract => "-",
			Multiply => "*",
			Divide => "/",
		}
	}
}

impl Display for BinaryOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.symbol()) }
}

/// Prints the expression as source text that parses back to the same tree.
impl Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.kind {
			ExprKind::Literal(literal) => write!(f, "{literal}"),
			ExprKind::Group(inner) => write!(f, "({inner})"),
			ExprKind::Binary { operator, left, right } => write!(f, "{left} {operator} {right}"),
			ExprKind::Access { receiver, name, .. } => {
				if let Some(receiver) = receiver {
					write!(f, "{receiver}.")?;
				}
				write!(f, "{name}")
			}
			ExprKind::Function { receiver, name, arguments, .. } => {
				if let Some(receiver) = receiver {
					write!(f, "{receiver}.")?;
				}
				let arguments = arguments.iter().map(|argument| argument.to_string()).collect::<Vec<_>>();
				write!(f, "{name}({})", arguments.join(", "))
			}
		}
	}
}

impl Display for Literal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Literal::Nil => write!(f, "NIL"),
			Literal::Boolean(true) => write!(f, "TRUE"),
			Literal::Boolean(false) => write!(f, "FALSE"),
			Literal::Integer(value) => write!(f, "{value}"),
			Literal::Decimal(value) => write!(f, "{}", plain_decimal(value)),
			Literal::Character(c) => write!(f, "'{}'", escape(&c.to_string())),
			Literal::String(s) => write!(f, "\"{}\"", escape(s)),
		}
	}
}

/// Reverse of the parser's unescaping, for printing literals back as source.
fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'\u{8}' => escaped.push_str("\\b"),
			'\u{c}' => escaped.push_str("\\f"),
			'\n' => escaped.push_str("\\n"),
			'\r' => escaped.push_str("\\r"),
			'\t' => escaped.push_str("\\t"),
			'\'' => escaped.push_str("\\'"),
			'"' => escaped.push_str("\\\""),
			'\\' => escaped.push_str("\\\\"),
			c => escaped.push(c),
		}
	}
	escaped
}
