use crate::analyzer::Type;

/// A static semantic violation. Top-level violations carry no offset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{type}", self.location())]
pub struct AnalysisError {
	pub offset: Option<usize>,
	pub r#type: AnalysisErrorType,
}

impl AnalysisError {
	pub fn new(offset: usize, r#type: AnalysisErrorType) -> Self { Self { offset: Some(offset), r#type } }

	pub fn top_level(r#type: AnalysisErrorType) -> Self { Self { offset: None, r#type } }

	fn location(&self) -> String { self.offset.map(|offset| format!("offset {offset}: ")).unwrap_or_default() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisErrorType {
	/// No `main` method taking zero parameters and returning `Integer`.
	MissingMain,
	UnknownType(String),
	UndefinedVariable(String),
	UndefinedFunction { name: String, arity: usize },
	/// A declaration with neither a type name nor an initializer.
	MissingType(String),
	NotAssignable { target: Type, source: Type },
	InvalidOperands { operator: &'static str, left: Type, right: Type },
	IntegerOutOfRange(String),
	DecimalOutOfRange(String),
	/// Expression statements must be calls.
	NotACall,
	/// A parenthesized group must wrap a binary expression.
	GroupNotBinary,
	InvalidAssignmentTarget,
	EmptyIf,
	EmptyFor,
}

impl std::fmt::Display for AnalysisErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use AnalysisErrorType::*;
		match self {
			MissingMain => write!(f, "Missing method 'main' with no parameters returning Integer"),
			UnknownType(name) => write!(f, "Unknown type '{name}'"),
			UndefinedVariable(name) => write!(f, "Undefined variable '{name}'"),
			UndefinedFunction { name, arity } => write!(f, "Undefined function '{name}/{arity}'"),
			MissingType(name) => write!(f, "Declaration of '{name}' needs a type or an initial value"),
			NotAssignable { target, source } => write!(f, "Type {source} is not assignable to {target}"),
			InvalidOperands { operator, left, right } => {
				write!(f, "Operator '{operator}' cannot be applied to {left} and {right}")
			}
			IntegerOutOfRange(literal) => write!(f, "Integer literal {literal} is out of range"),
			DecimalOutOfRange(literal) => write!(f, "Decimal literal {literal} is out of range"),
			NotACall => write!(f, "Expression statement must be a function call"),
			GroupNotBinary => write!(f, "Grouped expression must be a binary expression"),
			InvalidAssignmentTarget => write!(f, "Assignment target must be a variable or field"),
			EmptyIf => write!(f, "IF statement needs at least one statement"),
			EmptyFor => write!(f, "FOR statement needs at least one statement"),
		}
	}
}
