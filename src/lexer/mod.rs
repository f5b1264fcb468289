//! Turns source text into tokens.
//!
//! At each position the first character decides the token class, in priority
//! order:
//!
//! |First character|Token
//! --|--
//! letter or `_`|identifier, continuing over letters, digits, `_` and `-`
//! digit, `+` or `-`|number; a sign without a digit after it is an operator
//! `'`|character literal
//! `"`|string literal
//! anything else|operator, `<=` `>=` `!=` `==` matched greedily
//!
//! Whitespace separates tokens and is dropped. Keywords are not recognized
//! here: `DO` is an identifier like any other and the parser decides what it
//! means by its text.
mod token;

use std::{iter::Peekable, str::CharIndices};

use TokenKind::*;
pub use token::*;

use crate::error::lexer::{LexError, LexErrorType};

/// Lex the whole source into tokens.
pub fn lex(source: &str) -> Result<Vec<Token<'_>>, LexError> { Lexer::new(source).lex() }

/// A lexer for source code
pub struct Lexer<'a> {
	/// User input source code
	source:      &'a str,
	/// User input source code iterator
	source_iter: Peekable<CharIndices<'a>>,
	/// Points at the beginning of the current token
	start:       usize,
	/// Points just past the last consumed character
	cursor:      usize,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a str) -> Self { Self { source, source_iter: source.char_indices().peekable(), start: 0, cursor: 0 } }

	/// Lex all tokens from the source code
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn lex(mut self) -> Result<Vec<Token<'a>>, LexError> {
		let mut tokens = Vec::new();
		while let Some(&(index, c)) = self.source_iter.peek() {
			if is_whitespace(c) {
				self.advance();
				continue;
			}
			// We are at the beginning of the next token.
			self.start = index;
			self.cursor = index;
			tokens.push(self.lex_token()?);
		}
		tracing::debug!(count = tokens.len(), "lexed tokens");
		Ok(tokens)
	}

	/// Lex a single token, the current character is not whitespace
	fn lex_token(&mut self) -> Result<Token<'a>, LexError> {
		let kind = match self.peek() {
			Some(c) if c.is_alphabetic() || c == '_' => self.identifier(),
			Some(c) if c.is_ascii_digit() || c == '+' || c == '-' => self.number()?,
			Some('\'') => self.character()?,
			Some('"') => self.string()?,
			_ => self.operator(),
		};
		let token = Token::new(kind, &self.source[self.start..self.cursor], self.start);
		tracing::trace!(?token, "token");
		Ok(token)
	}

	/// Lex an identifier or keyword
	fn identifier(&mut self) -> TokenKind {
		while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-') {
			self.advance();
		}
		Identifier
	}

	/// Lex a number literal, or a lone sign operator
	fn number(&mut self) -> Result<TokenKind, LexError> {
		let signed = matches!(self.peek(), Some('+' | '-'));
		if signed {
			self.advance();
		}
		if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
			// Only reachable with a sign, `lex_token` dispatches here on a digit otherwise.
			return Ok(Operator);
		}
		self.digits();

		// Look for a fractional part.
		if self.match_next('.') {
			if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
				return Err(LexError::new(self.offset(), LexErrorType::InvalidDecimal));
			}
			self.digits();
			return Ok(Decimal);
		}
		Ok(Integer)
	}

	fn digits(&mut self) {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}
	}

	/// Lex a character literal
	fn character(&mut self) -> Result<TokenKind, LexError> {
		self.advance(); // The opening '
		match self.peek() {
			None => return Err(LexError::new(self.offset(), LexErrorType::UnterminatedCharacter)),
			Some('\'') => return Err(LexError::new(self.offset(), LexErrorType::EmptyCharacter)),
			Some('\\') => self.escape()?,
			Some(_) => {
				self.advance();
			}
		}
		if !self.match_next('\'') {
			return Err(LexError::new(self.offset(), LexErrorType::UnterminatedCharacter));
		}
		Ok(Character)
	}

	/// Lex a string literal
	fn string(&mut self) -> Result<TokenKind, LexError> {
		self.advance(); // The opening "
		loop {
			match self.peek() {
				None => return Err(LexError::new(self.source.len(), LexErrorType::UnterminatedString)),
				Some('"') => break,
				Some('\\') => self.escape()?,
				Some(_) => {
					self.advance();
				}
			}
		}
		self.advance(); // The closing "
		Ok(String)
	}

	/// Consume a backslash and the escaped character after it
	fn escape(&mut self) -> Result<(), LexError> {
		self.advance(); // The backslash
		let offset = self.offset();
		match self.advance() {
			Some('b' | 'f' | 'n' | 'r' | 't' | '\'' | '"') => Ok(()),
			other => Err(LexError::new(offset, LexErrorType::InvalidEscape(other))),
		}
	}

	/// Lex an operator, two characters when it forms a comparison
	fn operator(&mut self) -> TokenKind {
		if let Some('<' | '>' | '!' | '=') = self.advance() {
			self.match_next('=');
		}
		Operator
	}

	/// Match the next character if it is the expected one
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		Some(c)
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Byte offset of the current character, or the source length at the end
	fn offset(&mut self) -> usize { self.source_iter.peek().map_or(self.source.len(), |&(i, _)| i) }
}

fn is_whitespace(c: char) -> bool { matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{8}') }
