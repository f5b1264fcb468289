//! Statements and top-level declarations.
//!
//! A program is a [`Source`]: global fields first, then methods. Method bodies
//! are flat lists of [`Stmt`]; blocks only appear as the bodies of `IF`, `FOR`
//! and `WHILE`, each of which owns its statement lists directly.

use std::fmt::{self, Display};

use crate::{analyzer, parser::expression::Expr};

/// A whole program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Source {
	pub fields:  Vec<Field>,
	pub methods: Vec<Method>,
}

/// A global `LET` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	pub name:      String,
	pub type_name: Option<String>,
	pub value:     Option<Expr>,
	pub offset:    usize,
	pub variable:  Option<analyzer::Variable>,
}

/// A `DEF` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
	pub name:             String,
	pub parameters:       Vec<Parameter>,
	pub return_type_name: Option<String>,
	pub statements:       Vec<Stmt>,
	pub offset:           usize,
	pub function:         Option<analyzer::Function>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
	pub name:      String,
	pub type_name: String,
}

/// A statement in the programming language.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
	/// An expression used as a statement; only calls survive analysis.
	Expression(Expr),
	/// A local `LET`.
	Declaration {
		name:      String,
		type_name: Option<String>,
		value:     Option<Expr>,
		offset:    usize,
		variable:  Option<analyzer::Variable>,
	},
	Assignment {
		receiver: Expr,
		value:    Expr,
	},
	If {
		condition:       Expr,
		then_statements: Vec<Stmt>,
		else_statements: Vec<Stmt>,
	},
	For {
		name:       String,
		value:      Expr,
		statements: Vec<Stmt>,
	},
	While {
		condition:  Expr,
		statements: Vec<Stmt>,
	},
	Return(Expr),
}

const INDENT: &str = "    ";

fn write_declaration(
	f: &mut fmt::Formatter<'_>,
	name: &str,
	type_name: &Option<String>,
	value: &Option<Expr>,
) -> fmt::Result {
	write!(f, "LET {name}")?;
	if let Some(type_name) = type_name {
		write!(f, ": {type_name}")?;
	}
	if let Some(value) = value {
		write!(f, " = {value}")?;
	}
	write!(f, ";")
}

fn write_block(f: &mut fmt::Formatter<'_>, statements: &[Stmt], depth: usize) -> fmt::Result {
	for statement in statements {
		statement.write_indented(f, depth)?;
	}
	Ok(())
}

impl Stmt {
	/// Writes the statement on its own line(s) at the given nesting depth.
	fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
		let indent = INDENT.repeat(depth);
		write!(f, "{indent}")?;
		match self {
			Stmt::Expression(expr) => write!(f, "{expr};")?,
			Stmt::Declaration { name, type_name, value, .. } => write_declaration(f, name, type_name, value)?,
			Stmt::Assignment { receiver, value } => write!(f, "{receiver} = {value};")?,
			Stmt::If { condition, then_statements, else_statements } => {
				writeln!(f, "IF {condition} DO")?;
				write_block(f, then_statements, depth + 1)?;
				if !else_statements.is_empty() {
					writeln!(f, "{indent}ELSE")?;
					write_block(f, else_statements, depth + 1)?;
				}
				write!(f, "{indent}END")?;
			}
			Stmt::For { name, value, statements } => {
				writeln!(f, "FOR {name} IN {value} DO")?;
				write_block(f, statements, depth + 1)?;
				write!(f, "{indent}END")?;
			}
			Stmt::While { condition, statements } => {
				writeln!(f, "WHILE {condition} DO")?;
				write_block(f, statements, depth + 1)?;
				write!(f, "{indent}END")?;
			}
			Stmt::Return(value) => write!(f, "RETURN {value};")?,
		}
		writeln!(f)
	}
}

impl Display for Stmt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.write_indented(f, 0) }
}

impl Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_declaration(f, &self.name, &self.type_name, &self.value)?;
		writeln!(f)
	}
}

impl Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parameters = self
			.parameters
			.iter()
			.map(|parameter| format!("{}: {}", parameter.name, parameter.type_name))
			.collect::<Vec<_>>();
		write!(f, "DEF {}({})", self.name, parameters.join(", "))?;
		if let Some(return_type_name) = &self.return_type_name {
			write!(f, ": {return_type_name}")?;
		}
		writeln!(f, " DO")?;
		write_block(f, &self.statements, 1)?;
		writeln!(f, "END")
	}
}

/// Prints the program as source text.
impl Display for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for field in &self.fields {
			write!(f, "{field}")?;
		}
		for method in &self.methods {
			write!(f, "{method}")?;
		}
		Ok(())
	}
}
