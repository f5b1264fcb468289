#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("offset {offset}: {type}")]
pub struct ParseError {
	pub offset: usize,
	pub r#type: ParseErrorType,
}

impl ParseError {
	pub fn new(offset: usize, r#type: ParseErrorType) -> Self { Self { offset, r#type } }

	pub fn expected(offset: usize, expected: impl Into<String>, found: Option<&str>) -> Self {
		let found = found.map_or_else(|| "end of input".to_string(), |literal| format!("'{literal}'"));
		Self::new(offset, ParseErrorType::Expected { expected: expected.into(), found })
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorType {
	/// A required token is missing; `found` describes what was there instead.
	Expected { expected: String, found: String },
	/// No expression can start with this token.
	ExpectedExpression(String),
	/// Tokens left over after the last method.
	UnexpectedToken(String),
	/// The lexer handed over a literal the parser cannot convert.
	InvalidLiteral(String),
}

impl std::fmt::Display for ParseErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorType::*;
		match self {
			Expected { expected, found } => write!(f, "Expected {expected}, found {found}"),
			ExpectedExpression(found) => write!(f, "Expected expression, found {found}"),
			UnexpectedToken(literal) => write!(f, "Unexpected token '{literal}'"),
			InvalidLiteral(literal) => write!(f, "Invalid literal '{literal}'"),
		}
	}
}
