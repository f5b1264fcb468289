//! The parser turns the lexer's flat token list into a [`Source`] tree by
//! recursive descent, one method per grammar rule. It stops at the first
//! violation; there is no error recovery. Nesting depth is bounded only by
//! the host stack, so pathologically deep expressions overflow it.
//!
//! |Name|Operators|Associates
//! --|--|--
//! Logical|AND OR|Left
//! Comparison|== != < <= > >=|Left
//! Additive|+ -|Left
//! Multiplicative|* /|Left
//! Secondary|. (member access, method call)|Left
//!
//! ``` BNF
//! source         → field* method* ;
//! field          → "LET" IDENT ( ":" IDENT )? ( "=" expression )? ";" ;
//! method         → "DEF" IDENT "(" ( IDENT ":" IDENT ( "," IDENT ":" IDENT )* )? ")"
//!                  ( ":" IDENT )? "DO" statement* "END" ;
//! statement      → "LET" IDENT ( ":" IDENT )? ( "=" expression )? ";"
//!                | "IF" expression "DO" statement* ( "ELSE" statement* )? "END"
//!                | "FOR" IDENT "IN" expression "DO" statement* "END"
//!                | "WHILE" expression "DO" statement* "END"
//!                | "RETURN" expression ";"
//!                | expression ( "=" expression )? ";" ;
//! expression     → logical ;
//! logical        → comparison ( ( "AND" | "OR" ) comparison )* ;
//! comparison     → additive ( ( "==" | "!=" | "<" | "<=" | ">" | ">=" ) additive )* ;
//! additive       → multiplicative ( ( "+" | "-" ) multiplicative )* ;
//! multiplicative → secondary ( ( "*" | "/" ) secondary )* ;
//! secondary      → primary ( "." IDENT ( "(" arguments? ")" )? )* ;
//! primary        → "NIL" | "TRUE" | "FALSE" | INTEGER | DECIMAL | CHARACTER | STRING
//!                | IDENT ( "(" arguments? ")" )? | "(" expression ")" ;
//! arguments      → expression ( "," expression )* ;
//! ```

pub mod expression;

use std::{iter::Peekable, str::FromStr, vec::IntoIter};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{
	error::parser::{ParseError, ParseErrorType},
	lexer::{Token, TokenKind},
	parser::expression::{BinaryOperator, Expr, Literal},
	statement::{Field, Method, Parameter, Source, Stmt},
};

/// Parses a whole program.
pub fn parse(tokens: Vec<Token<'_>>) -> Result<Source, ParseError> { Parser::new(tokens).parse() }

pub struct Parser<'a> {
	/// The tokens to parse.
	tokens: Peekable<IntoIter<Token<'a>>>,
	/// Offset reported when input runs out.
	end:    usize,
}

impl<'a> Parser<'a> {
	pub fn new(tokens: Vec<Token<'a>>) -> Self {
		let end = tokens.last().map_or(0, Token::end);
		Self { tokens: tokens.into_iter().peekable(), end }
	}

	#[tracing::instrument(level = "debug", skip_all)]
	pub fn parse(mut self) -> Result<Source, ParseError> {
		let mut source = Source::default();
		while self.peek_is("LET") {
			source.fields.push(self.field()?);
		}
		while self.peek_is("DEF") {
			source.methods.push(self.method()?);
		}
		if let Some(token) = self.tokens.next() {
			return Err(ParseError::new(token.offset, ParseErrorType::UnexpectedToken(token.literal.to_string())));
		}
		tracing::debug!(fields = source.fields.len(), methods = source.methods.len(), "parsed source");
		Ok(source)
	}

	fn field(&mut self) -> Result<Field, ParseError> {
		let offset = self.expect("LET")?.offset;
		let (name, type_name, value) = self.declaration()?;
		self.expect(";")?;
		Ok(Field { name, type_name, value, offset, variable: None })
	}

	fn method(&mut self) -> Result<Method, ParseError> {
		let offset = self.expect("DEF")?.offset;
		let name = self.identifier("method name")?;
		self.expect("(")?;
		let mut parameters = Vec::new();
		if !self.peek_is(")") {
			loop {
				let name = self.identifier("parameter name")?;
				self.expect(":")?;
				let type_name = self.identifier("parameter type")?;
				parameters.push(Parameter { name, type_name });
				if !self.match_literal(",") {
					break;
				}
			}
		}
		self.expect(")")?;
		let return_type_name = if self.match_literal(":") { Some(self.identifier("return type")?) } else { None };
		self.expect("DO")?;
		let statements = self.block(&["END"])?;
		self.expect("END")?;
		Ok(Method { name, parameters, return_type_name, statements, offset, function: None })
	}

	/// The shared tail of fields and local declarations, after `LET`.
	fn declaration(&mut self) -> Result<(String, Option<String>, Option<Expr>), ParseError> {
		let name = self.identifier("variable name")?;
		let type_name = if self.match_literal(":") { Some(self.identifier("type name")?) } else { None };
		let value = if self.match_literal("=") { Some(self.expression()?) } else { None };
		Ok((name, type_name, value))
	}

	/// Statements up to, not including, one of the `terminators`.
	fn block(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>, ParseError> {
		let mut statements = Vec::new();
		loop {
			match self.tokens.peek() {
				None => {
					let expected = terminators.iter().map(|t| format!("'{t}'")).collect::<Vec<_>>().join(" or ");
					return Err(ParseError::expected(self.end, expected, None));
				}
				Some(token) if terminators.contains(&token.literal) => return Ok(statements),
				Some(_) => statements.push(self.statement()?),
			}
		}
	}

	fn statement(&mut self) -> Result<Stmt, ParseError> {
		let Some(token) = self.tokens.peek().copied() else {
			return Err(ParseError::new(self.end, ParseErrorType::ExpectedExpression("end of input".to_string())));
		};
		match token.literal {
			"LET" => {
				self.advance();
				let (name, type_name, value) = self.declaration()?;
				self.expect(";")?;
				Ok(Stmt::Declaration { name, type_name, value, offset: token.offset, variable: None })
			}
			"IF" => {
				self.advance();
				let condition = self.expression()?;
				self.expect("DO")?;
				let then_statements = self.block(&["ELSE", "END"])?;
				let else_statements = if self.match_literal("ELSE") { self.block(&["END"])? } else { Vec::new() };
				self.expect("END")?;
				Ok(Stmt::If { condition, then_statements, else_statements })
			}
			"FOR" => {
				self.advance();
				let name = self.identifier("loop variable")?;
				self.expect("IN")?;
				let value = self.expression()?;
				self.expect("DO")?;
				let statements = self.block(&["END"])?;
				self.expect("END")?;
				Ok(Stmt::For { name, value, statements })
			}
			"WHILE" => {
				self.advance();
				let condition = self.expression()?;
				self.expect("DO")?;
				let statements = self.block(&["END"])?;
				self.expect("END")?;
				Ok(Stmt::While { condition, statements })
			}
			"RETURN" => {
				self.advance();
				let value = self.expression()?;
				self.expect(";")?;
				Ok(Stmt::Return(value))
			}
			_ => {
				let expr = self.expression()?;
				if self.match_literal("=") {
					let value = self.expression()?;
					self.expect(";")?;
					Ok(Stmt::Assignment { receiver: expr, value })
				} else {
					self.expect(";")?;
					Ok(Stmt::Expression(expr))
				}
			}
		}
	}

	fn expression(&mut self) -> Result<Expr, ParseError> { self.logical() }

	fn logical(&mut self) -> Result<Expr, ParseError> {
		self.binary(&BinaryOperator::LOGICAL, Self::comparison)
	}

	fn comparison(&mut self) -> Result<Expr, ParseError> {
		self.binary(&BinaryOperator::COMPARISON, Self::additive)
	}

	fn additive(&mut self) -> Result<Expr, ParseError> {
		self.binary(&BinaryOperator::ADDITIVE, Self::multiplicative)
	}

	fn multiplicative(&mut self) -> Result<Expr, ParseError> {
		self.binary(&BinaryOperator::MULTIPLICATIVE, Self::secondary)
	}

	/// One left-associative tier: `operand ( operator operand )*`.
	fn binary(
		&mut self,
		operators: &[BinaryOperator],
		mut operand: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
	) -> Result<Expr, ParseError> {
		let mut expr = operand(self)?;
		while let Some(operator) = self.match_operator(operators) {
			let right = operand(self)?;
			expr = Expr::binary(operator, expr, right);
		}
		Ok(expr)
	}

	fn secondary(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.primary()?;
		while self.match_literal(".") {
			let offset = self.offset();
			let name = self.identifier("member name")?;
			expr = if self.match_literal("(") {
				let arguments = self.arguments()?;
				Expr::function(Some(expr), name, arguments, offset)
			} else {
				Expr::access(Some(expr), name, offset)
			};
		}
		Ok(expr)
	}

	fn primary(&mut self) -> Result<Expr, ParseError> {
		let Some(token) = self.advance() else {
			return Err(ParseError::new(self.end, ParseErrorType::ExpectedExpression("end of input".to_string())));
		};
		let offset = token.offset;
		let literal = match token.kind {
			TokenKind::Identifier => match token.literal {
				"NIL" => Literal::Nil,
				"TRUE" => Literal::Boolean(true),
				"FALSE" => Literal::Boolean(false),
				name => {
					return Ok(if self.match_literal("(") {
						Expr::function(None, name, self.arguments()?, offset)
					} else {
						Expr::access(None, name, offset)
					});
				}
			},
			TokenKind::Integer => Literal::Integer(
				BigInt::from_str(unsigned(token.literal)).map_err(|_| invalid_literal(&token))?,
			),
			TokenKind::Decimal => Literal::Decimal(
				BigDecimal::from_str(unsigned(token.literal)).map_err(|_| invalid_literal(&token))?,
			),
			TokenKind::Character => {
				let mut chars = unescape(unquote(token.literal)).chars().collect::<Vec<_>>();
				if chars.len() != 1 {
					return Err(invalid_literal(&token));
				}
				Literal::Character(chars.remove(0))
			}
			TokenKind::String => Literal::String(unescape(unquote(token.literal))),
			TokenKind::Operator if token.is("(") => {
				let inner = self.expression()?;
				self.expect(")")?;
				return Ok(Expr::group(inner, offset));
			}
			TokenKind::Operator => {
				return Err(ParseError::new(offset, ParseErrorType::ExpectedExpression(format!("'{}'", token.literal))));
			}
		};
		Ok(Expr::literal(literal, offset))
	}

	/// Arguments after an opening `(`, through the closing `)`.
	fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
		let mut arguments = Vec::new();
		if self.match_literal(")") {
			return Ok(arguments);
		}
		loop {
			arguments.push(self.expression()?);
			if !self.match_literal(",") {
				break;
			}
		}
		self.expect(")")?;
		Ok(arguments)
	}

	fn advance(&mut self) -> Option<Token<'a>> { self.tokens.next() }

	fn peek_is(&mut self, literal: &str) -> bool { self.tokens.peek().is_some_and(|token| token.is(literal)) }

	/// Offset of the next token, or the end of input.
	fn offset(&mut self) -> usize { self.tokens.peek().map_or(self.end, |token| token.offset) }

	fn match_literal(&mut self, literal: &str) -> bool { self.tokens.next_if(|token| token.is(literal)).is_some() }

	fn match_operator(&mut self, operators: &[BinaryOperator]) -> Option<BinaryOperator> {
		let token = self.tokens.peek()?;
		let operator = operators.iter().copied().find(|operator| token.is(operator.symbol()))?;
		self.advance();
		Some(operator)
	}

	fn expect(&mut self, literal: &str) -> Result<Token<'a>, ParseError> {
		match self.tokens.next_if(|token| token.is(literal)) {
			Some(token) => Ok(token),
			None => Err(self.expected(format!("'{literal}'"))),
		}
	}

	fn identifier(&mut self, what: &str) -> Result<String, ParseError> {
		match self.tokens.next_if(|token| token.kind == TokenKind::Identifier) {
			Some(token) => Ok(token.literal.to_string()),
			None => Err(self.expected(what)),
		}
	}

	/// An `Expected` error at the next token, or at the end of input.
	fn expected(&mut self, expected: impl Into<String>) -> ParseError {
		match self.tokens.peek() {
			Some(token) => ParseError::expected(token.offset, expected, Some(token.literal)),
			None => ParseError::expected(self.end, expected, None),
		}
	}
}

fn invalid_literal(token: &Token<'_>) -> ParseError {
	ParseError::new(token.offset, ParseErrorType::InvalidLiteral(token.literal.to_string()))
}

/// Drops an explicit `+` sign, which the number parsers do not all accept.
fn unsigned(literal: &str) -> &str { literal.strip_prefix('+').unwrap_or(literal) }

/// Strips the surrounding quotes of a character or string literal.
fn unquote(literal: &str) -> &str {
	let mut chars = literal.chars();
	chars.next();
	chars.next_back();
	chars.as_str()
}

fn unescape(text: &str) -> String {
	let mut result = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			result.push(c);
			continue;
		}
		match chars.next() {
			Some('b') => result.push('\u{8}'),
			Some('f') => result.push('\u{c}'),
			Some('n') => result.push('\n'),
			Some('r') => result.push('\r'),
			Some('t') => result.push('\t'),
			Some(escaped) => result.push(escaped),
			None => result.push('\\'),
		}
	}
	result
}

#[cfg(test)]
mod tests {
	use indoc::indoc;

	use super::*;
	use crate::{lexer::lex, parser::expression::ExprKind};

	fn parse_source(input: &str) -> Result<Source, ParseError> { parse(lex(input).unwrap()) }

	/// Parses a single expression by wrapping it in a return statement.
	fn parse_expression(input: &str) -> Expr {
		let source = parse_source(&format!("DEF main() DO RETURN {input}; END")).unwrap();
		match source.methods.into_iter().next().unwrap().statements.into_iter().next().unwrap() {
			Stmt::Return(expr) => expr,
			other => panic!("expected return, got {other:?}"),
		}
	}

	/// Renders an expression as a fully parenthesized s-expression.
	fn sexp(expr: &Expr) -> String {
		match &expr.kind {
			ExprKind::Literal(literal) => literal.to_string(),
			ExprKind::Group(inner) => format!("(group {})", sexp(inner)),
			ExprKind::Binary { operator, left, right } => format!("({operator} {} {})", sexp(left), sexp(right)),
			ExprKind::Access { receiver: None, name, .. } => name.clone(),
			ExprKind::Access { receiver: Some(receiver), name, .. } => format!("(. {} {name})", sexp(receiver)),
			ExprKind::Function { receiver, name, arguments, .. } => {
				let mut parts = vec![name.clone()];
				parts.extend(receiver.iter().map(|receiver| sexp(receiver)));
				parts.extend(arguments.iter().map(sexp));
				format!("(call {})", parts.join(" "))
			}
		}
	}

	fn expression(input: &str, expected: &str) { assert_eq!(sexp(&parse_expression(input)), expected, "{input}") }

	fn error(input: &str) -> ParseError { parse_source(input).unwrap_err() }

	#[test]
	fn parse_literals() {
		expression("NIL", "NIL");
		expression("TRUE", "TRUE");
		expression("FALSE", "FALSE");
		expression("+12", "12");
		expression("-3.50", "-3.50");
		expression("'c'", "'c'");
		expression(r"'\n'", r"'\n'");
		expression(r#""a\tb""#, r#""a\tb""#);
	}

	#[test]
	fn escapes_are_decoded() {
		let expr = parse_expression(r#""say \"hi\"\n""#);
		assert_eq!(expr.kind, ExprKind::Literal(Literal::String("say \"hi\"\n".to_string())));
		let expr = parse_expression(r"'\''");
		assert_eq!(expr.kind, ExprKind::Literal(Literal::Character('\'')));
	}

	#[test]
	fn parse_precedence() {
		expression("1 + 2 * 3", "(+ 1 (* 2 3))");
		expression("1 - 2 - 3", "(- (- 1 2) 3)");
		expression("a < b == TRUE", "(== (< a b) TRUE)");
		expression("a AND b OR c", "(OR (AND a b) c)");
		expression("x == 1 AND y != 2", "(AND (== x 1) (!= y 2))");
		expression("(1 + 2) * 3", "(* (group (+ 1 2)) 3)");
	}

	#[test]
	fn parse_access_and_calls() {
		expression("name", "name");
		expression("f()", "(call f)");
		expression("f(1, x)", "(call f 1 x)");
		expression("obj.field", "(. obj field)");
		expression("obj.method(1)", "(call method obj 1)");
		expression("a.b.c()", "(call c (. a b))");
	}

	#[test]
	fn parse_fields_and_methods() {
		let source = parse_source(indoc! {r#"
			LET count: Integer = 1;
			LET name = "x";
			LET empty: String;
			DEF add(a: Integer, b: Integer): Integer DO
				RETURN a + b;
			END
			DEF main() DO
				print(add(count, 2));
			END
		"#})
		.unwrap();
		assert_eq!(source.fields.len(), 3);
		assert_eq!(source.fields[0].type_name.as_deref(), Some("Integer"));
		assert!(source.fields[1].type_name.is_none());
		assert!(source.fields[2].value.is_none());
		assert_eq!(source.methods.len(), 2);
		let add = &source.methods[0];
		assert_eq!(add.parameters, vec![
			Parameter { name: "a".to_string(), type_name: "Integer".to_string() },
			Parameter { name: "b".to_string(), type_name: "Integer".to_string() },
		]);
		assert_eq!(add.return_type_name.as_deref(), Some("Integer"));
		assert!(source.methods[1].return_type_name.is_none());
	}

	#[test]
	fn parse_statements() {
		let source = parse_source(indoc! {"
			DEF main() DO
				LET x = 1;
				x = x + 1;
				IF x > 1 DO print(x); ELSE print(0); END
				IF TRUE DO print(1); END
				FOR i IN range DO print(i); END
				WHILE x < 10 DO x = x + 1; END
				RETURN x;
			END
		"})
		.unwrap();
		let statements = &source.methods[0].statements;
		assert!(matches!(statements[0], Stmt::Declaration { ref name, .. } if name == "x"));
		assert!(matches!(statements[1], Stmt::Assignment { .. }));
		assert!(matches!(&statements[2], Stmt::If { then_statements, else_statements, .. }
			if then_statements.len() == 1 && else_statements.len() == 1));
		assert!(matches!(&statements[3], Stmt::If { else_statements, .. } if else_statements.is_empty()));
		assert!(matches!(&statements[4], Stmt::For { name, .. } if name == "i"));
		assert!(matches!(statements[5], Stmt::While { .. }));
		assert!(matches!(statements[6], Stmt::Return(_)));
	}

	#[test]
	fn offsets_point_at_tokens() {
		let source = parse_source("LET x = 1;\nDEF main() DO RETURN obj.field; END").unwrap();
		assert_eq!(source.fields[0].offset, 0);
		assert_eq!(source.methods[0].offset, 11);
		let Stmt::Return(expr) = &source.methods[0].statements[0] else { panic!() };
		assert_eq!(expr.offset, 36);
	}

	#[test]
	fn missing_semicolon() {
		let err = error("DEF main() DO RETURN 1 END");
		assert_eq!(err.offset, 23);
		assert_eq!(err.r#type, ParseErrorType::Expected { expected: "';'".to_string(), found: "'END'".to_string() });
	}

	#[test]
	fn missing_end_reports_end_of_input() {
		let input = "DEF main() DO RETURN 1;";
		let err = error(input);
		assert_eq!(err.offset, input.len());
		assert_eq!(err.r#type, ParseErrorType::Expected { expected: "'END'".to_string(), found: "end of input".to_string() });
	}

	#[test]
	fn parse_errors() {
		assert!(matches!(error("DEF main( DO END").r#type, ParseErrorType::Expected { .. }));
		assert!(matches!(error("DEF main() DO RETURN ); END").r#type, ParseErrorType::ExpectedExpression(_)));
		assert!(matches!(error("DEF main() DO END LET x = 1;").r#type, ParseErrorType::UnexpectedToken(_)));
		assert!(matches!(error("LET 1 = 2;").r#type, ParseErrorType::Expected { .. }));
		assert_eq!(error("DEF main() DO RETURN (1 + 2; END").offset, 27);
	}

	#[test]
	fn reparse_is_idempotent() {
		let input = indoc! {r#"
			LET greeting: String = "hi\n";
			LET total = 1.50;
			DEF fib(n: Integer): Integer DO
				IF n < 2 DO RETURN n; END
				RETURN fib(n - 1) + fib(n - 2);
			END
			DEF main(): Integer DO
				LET c = '\t';
				FOR i IN numbers DO print(i * (i + 1)); END
				WHILE total < 10.0 AND TRUE DO total = total + 1.0; END
				IF obj.flag OR FALSE DO obj.call(1, NIL); ELSE print(greeting); END
				RETURN fib(10);
			END
		"#};
		let printed = parse_source(input).unwrap().to_string();
		let reprinted = parse_source(&printed).unwrap().to_string();
		assert_eq!(printed, reprinted);
	}
}
