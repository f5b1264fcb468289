/// A lexing failure with the byte offset of the offending character.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("offset {offset}: {type}")]
pub struct LexError {
	/// Byte offset of the invalid or missing character.
	pub offset: usize,
	/// The kind of lexing failure.
	pub r#type: LexErrorType,
}

impl LexError {
	pub fn new(offset: usize, r#type: LexErrorType) -> Self { Self { offset, r#type } }
}

/// Types of lexing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorType {
	/// A `.` inside a number that is not followed by a digit.
	InvalidDecimal,
	/// A character literal without its closing quote.
	UnterminatedCharacter,
	/// A character literal with nothing between the quotes.
	EmptyCharacter,
	/// A string literal without its closing quote.
	UnterminatedString,
	/// A backslash followed by something outside `b f n r t ' "`.
	InvalidEscape(Option<char>),
}

impl std::fmt::Display for LexErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use LexErrorType::*;
		match self {
			InvalidDecimal => write!(f, "Expected digit after decimal point"),
			UnterminatedCharacter => write!(f, "Unterminated character literal"),
			EmptyCharacter => write!(f, "Empty character literal"),
			UnterminatedString => write!(f, "Unterminated string literal"),
			InvalidEscape(Some(c)) => write!(f, "Invalid escape sequence '\\{c}'"),
			InvalidEscape(None) => write!(f, "Invalid escape sequence at end of input"),
		}
	}
}
