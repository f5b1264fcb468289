//! Static analysis.
//!
//! One top-down walk over the [`Source`] that resolves every name to a
//! [`Variable`] or [`Function`] binding and gives every expression a [`Type`].
//! The results are written into the AST's annotation slots in place, and the
//! first violation stops the walk.

mod types;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
pub use types::*;

use crate::{
	environment::{ScopeId, Scopes},
	error::analyzer::{AnalysisError, AnalysisErrorType},
	parser::expression::{BinaryOperator, Expr, ExprKind, Literal},
	statement::{Field, Method, Source, Stmt},
};

/// Largest decimal literal magnitude, `1.7976931348623157e308`.
fn max_decimal() -> BigDecimal { BigDecimal::new(BigInt::from(17_976_931_348_623_157u64), -292) }

pub struct Analyzer {
	scopes: Scopes<Variable, Function>,
	types:  TypeRegistry,
}

impl Default for Analyzer {
	fn default() -> Self { Self::new() }
}

impl Analyzer {
	/// An analyzer whose global scope knows `print(Any): Nil`.
	pub fn new() -> Self {
		let mut analyzer = Self { scopes: Scopes::new(), types: TypeRegistry::new() };
		analyzer.define_function("print", vec![Type::Any], Type::Nil);
		analyzer
	}

	/// Registry for host-defined named types.
	pub fn types_mut(&mut self) -> &mut TypeRegistry { &mut self.types }

	/// Declares a host variable in the global scope.
	pub fn define_variable(&mut self, name: &str, ty: Type) {
		let root = self.scopes.root();
		self.scopes.define_variable(root, name, Variable::new(name, ty));
	}

	/// Declares a host function in the global scope.
	pub fn define_function(&mut self, name: &str, parameter_types: Vec<Type>, return_type: Type) {
		let root = self.scopes.root();
		let arity = parameter_types.len();
		self.scopes.define_function(root, name, arity, Function::new(name, parameter_types, return_type));
	}

	#[tracing::instrument(level = "debug", skip_all)]
	pub fn analyze(&mut self, source: &mut Source) -> Result<(), AnalysisError> {
		let root = self.scopes.root();
		for field in &mut source.fields {
			self.field(field, root)?;
		}
		for method in &mut source.methods {
			self.method(method, root)?;
		}
		match self.scopes.lookup_function(root, "main", 0) {
			Some(main) if main.return_type == Type::Integer => Ok(()),
			_ => Err(AnalysisError::top_level(AnalysisErrorType::MissingMain)),
		}
	}

	fn field(&mut self, field: &mut Field, scope: ScopeId) -> Result<(), AnalysisError> {
		let variable =
			self.declaration(&field.name, field.type_name.as_deref(), field.value.as_mut(), field.offset, scope)?;
		field.variable = Some(variable);
		Ok(())
	}

	fn method(&mut self, method: &mut Method, scope: ScopeId) -> Result<(), AnalysisError> {
		tracing::debug!(name = method.name, "analyze method");
		let parameter_types = method
			.parameters
			.iter()
			.map(|parameter| self.resolve(&parameter.type_name, method.offset))
			.collect::<Result<Vec<_>, _>>()?;
		let return_type = match &method.return_type_name {
			Some(name) => self.resolve(name, method.offset)?,
			None => Type::Nil,
		};
		let function = Function::new(&method.name, parameter_types.clone(), return_type.clone());
		self.scopes.define_function(scope, &method.name, parameter_types.len(), function.clone());
		method.function = Some(function);

		let body = self.scopes.push(scope);
		for (parameter, ty) in method.parameters.iter().zip(parameter_types) {
			self.scopes.define_variable(body, &parameter.name, Variable::new(&parameter.name, ty));
		}
		let result = self.statements(&mut method.statements, body, &return_type);
		self.scopes.pop(body);
		result
	}

	/// Shared by fields and local `LET`s. Defines the variable in `scope`.
	fn declaration(
		&mut self,
		name: &str,
		type_name: Option<&str>,
		value: Option<&mut Expr>,
		offset: usize,
		scope: ScopeId,
	) -> Result<Variable, AnalysisError> {
		let declared = type_name.map(|type_name| self.resolve(type_name, offset)).transpose()?;
		let ty = match (declared, value) {
			(Some(declared), Some(value)) => {
				let source = self.expression(value, scope)?;
				require_assignable(&declared, &source, value.offset)?;
				declared
			}
			(Some(declared), None) => declared,
			(None, Some(value)) => self.expression(value, scope)?,
			(None, None) => return Err(AnalysisError::new(offset, AnalysisErrorType::MissingType(name.to_string()))),
		};
		let variable = Variable::new(name, ty);
		self.scopes.define_variable(scope, name, variable.clone());
		Ok(variable)
	}

	fn resolve(&self, name: &str, offset: usize) -> Result<Type, AnalysisError> {
		self.types.resolve(name).ok_or_else(|| AnalysisError::new(offset, AnalysisErrorType::UnknownType(name.to_string())))
	}

	fn statements(&mut self, statements: &mut [Stmt], scope: ScopeId, return_type: &Type) -> Result<(), AnalysisError> {
		statements.iter_mut().try_for_each(|statement| self.statement(statement, scope, return_type))
	}

	/// Analyzes `statements` in a fresh child of `parent`.
	fn block(
		&mut self,
		statements: &mut [Stmt],
		parent: ScopeId,
		return_type: &Type,
		bind: Option<Variable>,
	) -> Result<(), AnalysisError> {
		let scope = self.scopes.push(parent);
		if let Some(variable) = bind {
			self.scopes.define_variable(scope, variable.name.clone(), variable);
		}
		let result = self.statements(statements, scope, return_type);
		self.scopes.pop(scope);
		result
	}

	fn statement(&mut self, statement: &mut Stmt, scope: ScopeId, return_type: &Type) -> Result<(), AnalysisError> {
		match statement {
			Stmt::Expression(expr) => {
				if !matches!(expr.kind, ExprKind::Function { .. }) {
					return Err(AnalysisError::new(expr.offset, AnalysisErrorType::NotACall));
				}
				self.expression(expr, scope)?;
			}
			Stmt::Declaration { name, type_name, value, offset, variable } => {
				*variable = Some(self.declaration(name, type_name.as_deref(), value.as_mut(), *offset, scope)?);
			}
			Stmt::Assignment { receiver, value } => {
				if !matches!(receiver.kind, ExprKind::Access { .. }) {
					return Err(AnalysisError::new(receiver.offset, AnalysisErrorType::InvalidAssignmentTarget));
				}
				let target = self.expression(receiver, scope)?;
				let source = self.expression(value, scope)?;
				require_assignable(&target, &source, value.offset)?;
			}
			Stmt::If { condition, then_statements, else_statements } => {
				self.condition(condition, scope)?;
				if then_statements.is_empty() {
					return Err(AnalysisError::new(condition.offset, AnalysisErrorType::EmptyIf));
				}
				self.block(then_statements, scope, return_type, None)?;
				self.block(else_statements, scope, return_type, None)?;
			}
			Stmt::For { name, value, statements } => {
				let ty = self.expression(value, scope)?;
				require_assignable(&Type::IntegerIterable, &ty, value.offset)?;
				if statements.is_empty() {
					return Err(AnalysisError::new(value.offset, AnalysisErrorType::EmptyFor));
				}
				self.block(statements, scope, return_type, Some(Variable::new(name.as_str(), Type::Integer)))?;
			}
			Stmt::While { condition, statements } => {
				self.condition(condition, scope)?;
				self.block(statements, scope, return_type, None)?;
			}
			Stmt::Return(value) => {
				let ty = self.expression(value, scope)?;
				require_assignable(return_type, &ty, value.offset)?;
			}
		}
		Ok(())
	}

	fn condition(&mut self, condition: &mut Expr, scope: ScopeId) -> Result<(), AnalysisError> {
		let ty = self.expression(condition, scope)?;
		require_assignable(&Type::Boolean, &ty, condition.offset)
	}

	/// Types `expr` and everything below it, recording the results in the tree.
	fn expression(&mut self, expr: &mut Expr, scope: ScopeId) -> Result<Type, AnalysisError> {
		let offset = expr.offset;
		let ty = match &mut expr.kind {
			ExprKind::Literal(literal) => literal_type(literal, offset)?,
			ExprKind::Group(inner) => {
				if !matches!(inner.kind, ExprKind::Binary { .. }) {
					return Err(AnalysisError::new(offset, AnalysisErrorType::GroupNotBinary));
				}
				self.expression(inner, scope)?
			}
			ExprKind::Binary { operator, left, right } => {
				let left = self.expression(left, scope)?;
				let right = self.expression(right, scope)?;
				binary_type(*operator, left, right, offset)?
			}
			ExprKind::Access { receiver, name, variable } => {
				let resolved = match receiver {
					Some(receiver) => {
						let receiver_type = self.expression(receiver, scope)?;
						self.types.members(&receiver_type).and_then(|members| members.variable(name)).cloned()
					}
					None => self.scopes.lookup_variable(scope, name).cloned(),
				};
				let resolved = resolved
					.ok_or_else(|| AnalysisError::new(offset, AnalysisErrorType::UndefinedVariable(name.clone())))?;
				let ty = resolved.ty.clone();
				*variable = Some(resolved);
				ty
			}
			ExprKind::Function { receiver, name, arguments, function } => {
				let receiver_type = match receiver {
					Some(receiver) => Some(self.expression(receiver, scope)?),
					None => None,
				};
				let argument_types =
					arguments.iter_mut().map(|argument| self.expression(argument, scope)).collect::<Result<Vec<_>, _>>()?;
				let arity = arguments.len();
				let resolved = match &receiver_type {
					Some(receiver_type) => {
						self.types.members(receiver_type).and_then(|members| members.function(name, arity)).cloned()
					}
					None => self.scopes.lookup_function(scope, name, arity).cloned(),
				};
				let resolved = resolved.ok_or_else(|| {
					AnalysisError::new(offset, AnalysisErrorType::UndefinedFunction { name: name.clone(), arity })
				})?;
				// a member method's first parameter is its receiver
				let skip = usize::from(receiver_type.is_some());
				for ((argument, source), target) in
					arguments.iter().zip(&argument_types).zip(resolved.parameter_types.iter().skip(skip))
				{
					require_assignable(target, source, argument.offset)?;
				}
				let ty = resolved.return_type.clone();
				*function = Some(resolved);
				ty
			}
		};
		expr.ty = Some(ty.clone());
		Ok(ty)
	}
}

fn require_assignable(target: &Type, source: &Type, offset: usize) -> Result<(), AnalysisError> {
	if target.accepts(source) {
		Ok(())
	} else {
		Err(AnalysisError::new(offset, AnalysisErrorType::NotAssignable { target: target.clone(), source: source.clone() }))
	}
}

fn literal_type(literal: &Literal, offset: usize) -> Result<Type, AnalysisError> {
	Ok(match literal {
		Literal::Nil => Type::Nil,
		Literal::Boolean(_) => Type::Boolean,
		Literal::Integer(value) => {
			if value.to_i32().is_none() {
				return Err(AnalysisError::new(offset, AnalysisErrorType::IntegerOutOfRange(value.to_string())));
			}
			Type::Integer
		}
		Literal::Decimal(value) => {
			if value.abs() > max_decimal() {
				return Err(AnalysisError::new(offset, AnalysisErrorType::DecimalOutOfRange(value.to_string())));
			}
			Type::Decimal
		}
		Literal::Character(_) => Type::Character,
		Literal::String(_) => Type::String,
	})
}

fn binary_type(operator: BinaryOperator, left: Type, right: Type, offset: usize) -> Result<Type, AnalysisError> {
	use BinaryOperator::*;
	let ty = match operator {
		And | Or if left == Type::Boolean && right == Type::Boolean => Some(Type::Boolean),
		And | Or => None,
		Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => {
			(Type::Comparable.accepts(&left) && Type::Comparable.accepts(&right)).then_some(Type::Boolean)
		}
		Add if left == Type::String || right == Type::String => Some(Type::String),
		Add | Subtract | Multiply | Divide => (left.is_numeric() && left == right).then(|| left.clone()),
	};
	ty.ok_or_else(|| {
		AnalysisError::new(offset, AnalysisErrorType::InvalidOperands { operator: operator.symbol(), left, right })
	})
}

#[cfg(test)]
mod tests {
	use indoc::indoc;

	use super::*;
	use crate::{lexer::lex, parser::parse};

	fn analyze_with(analyzer: &mut Analyzer, input: &str) -> Result<Source, AnalysisError> {
		let mut source = parse(lex(input).unwrap()).unwrap();
		analyzer.analyze(&mut source)?;
		Ok(source)
	}

	fn analyze(input: &str) -> Result<Source, AnalysisError> { analyze_with(&mut Analyzer::new(), input) }

	/// Wraps statements in a valid `main`.
	fn analyze_main(body: &str) -> Result<Source, AnalysisError> {
		analyze(&format!("DEF main(): Integer DO {body} RETURN 0; END"))
	}

	fn error_type(input: &str) -> AnalysisErrorType { analyze_main(input).unwrap_err().r#type }

	/// The type of the first statement's value in `main`.
	fn first_type(body: &str) -> Type {
		let source = analyze_main(body).unwrap();
		match &source.methods[0].statements[0] {
			Stmt::Declaration { variable: Some(variable), .. } => variable.ty.clone(),
			Stmt::Expression(expr) => expr.ty.clone().unwrap(),
			other => panic!("unexpected statement {other:?}"),
		}
	}

	/// A host type `Point` with a field `x` and a method `scale(Point, Integer): Point`.
	fn point_analyzer() -> Analyzer {
		let mut analyzer = Analyzer::new();
		let point = Type::Named("Point".to_string());
		let members = analyzer.types_mut().register("Point");
		members.define_variable("x", Variable::new("x", Type::Integer));
		members.define_function("scale", 1, Function::new("scale", vec![point.clone(), Type::Integer], point.clone()));
		analyzer.define_variable("origin", point);
		analyzer.define_variable("numbers", Type::IntegerIterable);
		analyzer
	}

	#[test]
	fn main_is_required() {
		let err = analyze("DEF helper(): Integer DO RETURN 1; END").unwrap_err();
		assert_eq!(err, AnalysisError::top_level(AnalysisErrorType::MissingMain));
		assert_eq!(analyze("DEF main() DO END").unwrap_err().r#type, AnalysisErrorType::MissingMain);
		assert_eq!(analyze("DEF main(x: Integer): Integer DO RETURN x; END").unwrap_err().offset, None);
		assert!(analyze("DEF main(): Integer DO RETURN 0; END").is_ok());
	}

	#[test]
	fn error_display() {
		let err = analyze("DEF main(): Integer DO RETURN x; END").unwrap_err();
		assert_eq!(err.to_string(), "offset 30: Undefined variable 'x'");
		let err = analyze("DEF helper() DO END").unwrap_err();
		assert_eq!(err.to_string(), "Missing method 'main' with no parameters returning Integer");
	}

	#[test]
	fn every_expression_is_typed() {
		let source = analyze(indoc! {r#"
			LET name = "world";
			DEF main(): Integer DO
				print("hello " + name);
				RETURN 1 + 2 * 3;
			END
		"#})
		.unwrap();
		assert_eq!(source.fields[0].variable, Some(Variable::new("name", Type::String)));
		let Stmt::Expression(call) = &source.methods[0].statements[0] else { panic!() };
		assert_eq!(call.ty, Some(Type::Nil));
		let ExprKind::Function { arguments, function, .. } = &call.kind else { panic!() };
		assert_eq!(function.as_ref().map(|f| f.parameter_types.clone()), Some(vec![Type::Any]));
		let ExprKind::Binary { right, .. } = &arguments[0].kind else { panic!() };
		let ExprKind::Access { variable, .. } = &right.kind else { panic!() };
		assert_eq!(variable, &Some(Variable::new("name", Type::String)));
		assert_eq!(source.methods[0].function, Some(Function::new("main", vec![], Type::Integer)));
	}

	#[test]
	fn literal_types() {
		assert_eq!(first_type("LET x = NIL;"), Type::Nil);
		assert_eq!(first_type("LET x = TRUE;"), Type::Boolean);
		assert_eq!(first_type("LET x = 1;"), Type::Integer);
		assert_eq!(first_type("LET x = 1.0;"), Type::Decimal);
		assert_eq!(first_type("LET x = 'c';"), Type::Character);
		assert_eq!(first_type("LET x = \"s\";"), Type::String);
	}

	#[test]
	fn literal_ranges() {
		assert_eq!(first_type("LET x = 2147483647;"), Type::Integer);
		assert_eq!(first_type("LET x = -2147483648;"), Type::Integer);
		assert!(matches!(error_type("LET x = 2147483648;"), AnalysisErrorType::IntegerOutOfRange(_)));
		let max = format!("17976931348623157{}.0", "0".repeat(292));
		assert_eq!(first_type(&format!("LET x = {max};")), Type::Decimal);
		let over = format!("17976931348623158{}.0", "0".repeat(292));
		assert!(matches!(error_type(&format!("LET x = {over};")), AnalysisErrorType::DecimalOutOfRange(_)));
	}

	#[test]
	fn binary_types() {
		assert_eq!(first_type("LET x = 1 + 2;"), Type::Integer);
		assert_eq!(first_type("LET x = 1.0 / 2.0;"), Type::Decimal);
		assert_eq!(first_type("LET x = \"a\" + 1;"), Type::String);
		assert_eq!(first_type("LET x = 1 + \"a\";"), Type::String);
		assert_eq!(first_type("LET x = 1 < 2;"), Type::Boolean);
		assert_eq!(first_type("LET x = 'a' == \"a\";"), Type::Boolean);
		assert_eq!(first_type("LET x = TRUE AND FALSE;"), Type::Boolean);
		assert!(matches!(error_type("LET x = 1 + 1.0;"), AnalysisErrorType::InvalidOperands { operator: "+", .. }));
		assert!(matches!(error_type("LET x = 'a' - 'b';"), AnalysisErrorType::InvalidOperands { .. }));
		assert!(matches!(error_type("LET x = 1 AND TRUE;"), AnalysisErrorType::InvalidOperands { .. }));
	}

	#[test]
	fn declarations() {
		assert_eq!(first_type("LET x: Decimal;"), Type::Decimal);
		assert_eq!(first_type("LET x: Any = 1;"), Type::Any);
		assert_eq!(error_type("LET x;"), AnalysisErrorType::MissingType("x".to_string()));
		assert_eq!(error_type("LET x: Widget;"), AnalysisErrorType::UnknownType("Widget".to_string()));
		assert_eq!(error_type("LET x: Decimal = 1;"), AnalysisErrorType::NotAssignable {
			target: Type::Decimal,
			source: Type::Integer,
		});
	}

	#[test]
	fn undefined_names() {
		assert_eq!(error_type("print(y);"), AnalysisErrorType::UndefinedVariable("y".to_string()));
		assert_eq!(error_type("print(1, 2);"), AnalysisErrorType::UndefinedFunction {
			name: "print".to_string(),
			arity: 2,
		});
	}

	#[test]
	fn statement_rules() {
		assert_eq!(error_type("1 + 2;"), AnalysisErrorType::NotACall);
		assert_eq!(error_type("LET x = (1);"), AnalysisErrorType::GroupNotBinary);
		assert_eq!(first_type("LET x = (1 + 2);"), Type::Integer);
		assert_eq!(error_type("IF TRUE DO ELSE print(1); END"), AnalysisErrorType::EmptyIf);
		assert!(matches!(error_type("IF 1 DO print(1); END"), AnalysisErrorType::NotAssignable { .. }));
		assert!(matches!(error_type("WHILE 'c' DO END"), AnalysisErrorType::NotAssignable { .. }));
		assert!(matches!(error_type("FOR i IN 1 DO print(i); END"), AnalysisErrorType::NotAssignable { .. }));
		assert_eq!(error_type("LET x = 1; print(x) = 2;"), AnalysisErrorType::InvalidAssignmentTarget);
		assert!(matches!(error_type("LET x = 1; x = \"s\";"), AnalysisErrorType::NotAssignable { .. }));
		assert!(analyze_main("LET x = 1; x = 2; WHILE x < 3 DO x = x + 1; END").is_ok());
	}

	#[test]
	fn for_loops() {
		let mut analyzer = point_analyzer();
		assert!(analyze_with(&mut analyzer, "DEF main(): Integer DO FOR i IN numbers DO print(i + 1); END RETURN 0; END").is_ok());
		let err = analyze_with(&mut point_analyzer(), "DEF main(): Integer DO FOR i IN numbers DO END RETURN 0; END")
			.unwrap_err();
		assert_eq!(err.r#type, AnalysisErrorType::EmptyFor);
	}

	#[test]
	fn redeclaring_after_block_exits() {
		assert!(analyze_main("LET i = 0; WHILE i < 1 DO LET t = 1; i = i + 1; END LET t = 2;").is_ok());
		assert!(analyze_main("IF TRUE DO LET t = 1; END LET t = \"s\"; print(t);").is_ok());
		assert_eq!(
			error_type("LET i = 0; WHILE i < 1 DO LET t = 1; i = i + 1; END print(t);"),
			AnalysisErrorType::UndefinedVariable("t".to_string())
		);
	}

	#[test]
	fn blocks_do_not_leak() {
		let err = analyze_main("IF TRUE DO LET inner = 1; END print(inner);").unwrap_err();
		assert_eq!(err.r#type, AnalysisErrorType::UndefinedVariable("inner".to_string()));
		let err = analyze(indoc! {"
			DEF helper() DO LET local = 1; END
			DEF main(): Integer DO RETURN local; END
		"})
		.unwrap_err();
		assert_eq!(err.r#type, AnalysisErrorType::UndefinedVariable("local".to_string()));
	}

	#[test]
	fn returns_match_method_type() {
		assert!(analyze("DEF f(): String DO RETURN \"s\"; END DEF main(): Integer DO RETURN 0; END").is_ok());
		let err = analyze("DEF f(): String DO RETURN 1; END DEF main(): Integer DO RETURN 0; END").unwrap_err();
		assert_eq!(err.offset, Some(26));
		assert!(matches!(analyze("DEF f() DO RETURN 1; END").unwrap_err().r#type, AnalysisErrorType::NotAssignable { .. }));
	}

	#[test]
	fn methods_and_recursion() {
		let source = analyze(indoc! {"
			DEF fact(n: Integer): Integer DO
				IF n <= 1 DO RETURN 1; END
				RETURN n * fact(n - 1);
			END
			DEF main(): Integer DO RETURN fact(5); END
		"});
		assert!(source.is_ok());
		let err = analyze(indoc! {"
			DEF main(): Integer DO RETURN later(); END
			DEF later(): Integer DO RETURN 1; END
		"})
		.unwrap_err();
		assert!(matches!(err.r#type, AnalysisErrorType::UndefinedFunction { .. }));
		let err = analyze("DEF f(x: Integer) DO END DEF main(): Integer DO f(\"s\"); RETURN 0; END").unwrap_err();
		assert!(matches!(err.r#type, AnalysisErrorType::NotAssignable { target: Type::Integer, source: Type::String }));
	}

	#[test]
	fn member_access() {
		let mut analyzer = point_analyzer();
		let source = analyze_with(&mut analyzer, indoc! {"
			DEF main(): Integer DO
				LET p = origin.scale(2);
				origin.x = 3;
				RETURN p.x;
			END
		"})
		.unwrap();
		let Stmt::Declaration { variable, .. } = &source.methods[0].statements[0] else { panic!() };
		assert_eq!(variable.as_ref().map(|v| &v.ty), Some(&Type::Named("Point".to_string())));

		let err = analyze_with(&mut point_analyzer(), "DEF main(): Integer DO RETURN origin.y; END").unwrap_err();
		assert_eq!(err.r#type, AnalysisErrorType::UndefinedVariable("y".to_string()));
		let err = analyze_with(&mut point_analyzer(), "DEF main(): Integer DO RETURN origin.scale(\"s\").x; END")
			.unwrap_err();
		assert!(matches!(err.r#type, AnalysisErrorType::NotAssignable { target: Type::Integer, .. }));
		let err = analyze_with(&mut point_analyzer(), "LET x = 1; DEF main(): Integer DO RETURN x.x; END").unwrap_err();
		assert_eq!(err.r#type, AnalysisErrorType::UndefinedVariable("x".to_string()));
	}
}
