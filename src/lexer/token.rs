/// A token produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
	pub kind:    TokenKind,
	/// The exact source text of the token, quotes and escapes included.
	pub literal: &'a str,
	/// Byte offset of the first character in the source.
	pub offset:  usize,
}

impl<'a> Token<'a> {
	pub fn new(kind: TokenKind, literal: &'a str, offset: usize) -> Self { Self { kind, literal, offset } }

	/// Byte offset just past the last character.
	pub fn end(&self) -> usize { self.offset + self.literal.len() }

	/// Whether this token's text is exactly `literal`. Keywords are matched this
	/// way, they are ordinary identifiers to the lexer.
	pub fn is(&self, literal: &str) -> bool { self.literal == literal }
}

/// The lexical classes of the language. The copying is lightweight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	/// Identifier or keyword, e.g. `name`, `DO`, `snake-case`.
	Identifier,
	/// Integer literal with optional sign, e.g. `-12`.
	Integer,
	/// Decimal literal with optional sign, e.g. `3.14`.
	Decimal,
	/// Character literal, e.g. `'c'`, `'\n'`.
	Character,
	/// String literal, e.g. `"hello"`.
	String,
	/// Any other single character, or one of `<=`, `>=`, `!=`, `==`.
	Operator,
}

impl std::fmt::Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use TokenKind::*;
		match self {
			Identifier => write!(f, "identifier"),
			Integer => write!(f, "integer"),
			Decimal => write!(f, "decimal"),
			Character => write!(f, "character"),
			String => write!(f, "string"),
			Operator => write!(f, "operator"),
		}
	}
}
