use std::{cmp::Ordering, fmt::Display, rc::Rc};

use Value::*;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{Signed, Zero, pow};

use crate::{error::interpreter::RuntimeFault, interpreter::instance, parser::expression::Literal, utils::{RcCell, plain_decimal}};

/// Value represents a runtime value.
#[derive(Debug, Clone)]
pub enum Value {
	Nil,
	Boolean(bool),
	Integer(BigInt),
	Decimal(BigDecimal),
	Character(char),
	String(std::string::String),
	Object(RcCell<instance::Object>),
	/// A host-provided sequence for `FOR` loops.
	Iterable(Rc<Vec<Value>>),
}

impl From<&Literal> for Value {
	fn from(literal: &Literal) -> Self {
		match literal {
			Literal::Nil => Nil,
			Literal::Boolean(b) => Boolean(*b),
			Literal::Integer(i) => Integer(i.clone()),
			Literal::Decimal(d) => Decimal(d.clone()),
			Literal::Character(c) => Character(*c),
			Literal::String(s) => String(s.clone()),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self { Boolean(value) }
}

impl From<i32> for Value {
	fn from(value: i32) -> Self { Integer(value.into()) }
}

impl From<i64> for Value {
	fn from(value: i64) -> Self { Integer(value.into()) }
}

impl From<&str> for Value {
	fn from(value: &str) -> Self { String(value.to_string()) }
}

impl FromIterator<Value> for Value {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self { Iterable(Rc::new(iter.into_iter().collect())) }
}

/// The textual form used by `print` and string concatenation.
impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Nil => write!(f, "NIL"),
			Boolean(b) => write!(f, "{b}"),
			Integer(i) => write!(f, "{i}"),
			Decimal(d) => write!(f, "{}", plain_decimal(d)),
			Character(c) => write!(f, "{c}"),
			String(s) => write!(f, "{s}"),
			Object(object) => write!(f, "{}", object.borrow()),
			Iterable(values) => {
				let values = values.iter().map(|value| value.to_string()).collect::<Vec<_>>();
				write!(f, "[{}]", values.join(", "))
			}
		}
	}
}

/// Structural equality. Values of different kinds are unequal, decimals compare
/// digits and scale (`1.0 != 1.00`), objects by identity.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Nil, Nil) => true,
			(Boolean(l), Boolean(r)) => l == r,
			(Integer(l), Integer(r)) => l == r,
			(Decimal(l), Decimal(r)) => l.as_bigint_and_exponent() == r.as_bigint_and_exponent(),
			(Character(l), Character(r)) => l == r,
			(String(l), String(r)) => l == r,
			(Object(l), Object(r)) => l.ptr_eq(r),
			(Iterable(l), Iterable(r)) => l == r,
			_ => false,
		}
	}
}

impl Value {
	/// Name of the runtime kind, for error messages.
	pub fn kind(&self) -> std::string::String {
		match self {
			Nil => "Nil".to_string(),
			Boolean(_) => "Boolean".to_string(),
			Integer(_) => "Integer".to_string(),
			Decimal(_) => "Decimal".to_string(),
			Character(_) => "Character".to_string(),
			String(_) => "String".to_string(),
			Object(object) => object.borrow().type_name.clone(),
			Iterable(_) => "IntegerIterable".to_string(),
		}
	}

	pub fn as_boolean(&self, operation: &'static str) -> Result<bool, RuntimeFault> {
		match self {
			Boolean(b) => Ok(*b),
			other => Err(mismatch(operation, "Boolean", other.kind())),
		}
	}

	/// `+`: numeric addition, or concatenation when either side is a string.
	pub fn add(&self, right: &Self) -> Result<Value, RuntimeFault> {
		Ok(match (self, right) {
			(String(_), _) | (_, String(_)) => String(format!("{self}{right}")),
			(Integer(l), Integer(r)) => Integer(l + r),
			(Decimal(l), Decimal(r)) => Decimal(l + r),
			_ => return Err(self.numeric_mismatch("+", right)),
		})
	}

	pub fn subtract(&self, right: &Self) -> Result<Value, RuntimeFault> {
		Ok(match (self, right) {
			(Integer(l), Integer(r)) => Integer(l - r),
			(Decimal(l), Decimal(r)) => Decimal(l - r),
			_ => return Err(self.numeric_mismatch("-", right)),
		})
	}

	pub fn multiply(&self, right: &Self) -> Result<Value, RuntimeFault> {
		Ok(match (self, right) {
			(Integer(l), Integer(r)) => Integer(l * r),
			(Decimal(l), Decimal(r)) => Decimal(l * r),
			_ => return Err(self.numeric_mismatch("*", right)),
		})
	}

	/// Integers truncate toward zero; decimals keep the left operand's scale,
	/// rounding half to even.
	pub fn divide(&self, right: &Self) -> Result<Value, RuntimeFault> {
		Ok(match (self, right) {
			(Integer(_), Integer(_)) | (Decimal(_), Decimal(_)) if right.is_zero() => return Err(RuntimeFault::DivisionByZero),
			(Integer(l), Integer(r)) => Integer(l / r),
			(Decimal(l), Decimal(r)) => Decimal(divide_decimal(l, r)),
			_ => return Err(self.numeric_mismatch("/", right)),
		})
	}

	/// Ordering for `<`, `<=`, `>` and `>=`. Both sides must be the same orderable kind.
	pub fn compare(&self, right: &Self, operation: &'static str) -> Result<Ordering, RuntimeFault> {
		Ok(match (self, right) {
			(Boolean(l), Boolean(r)) => l.cmp(r),
			(Integer(l), Integer(r)) => l.cmp(r),
			(Decimal(l), Decimal(r)) => l.cmp(r),
			(Character(l), Character(r)) => l.cmp(r),
			(String(l), String(r)) => l.cmp(r),
			_ => {
				return Err(mismatch(operation, "two values of the same comparable kind", self.pair_kind(right)));
			}
		})
	}

	fn is_zero(&self) -> bool {
		match self {
			Integer(i) => i.is_zero(),
			Decimal(d) => d.is_zero(),
			_ => false,
		}
	}

	fn pair_kind(&self, right: &Self) -> std::string::String { format!("{} and {}", self.kind(), right.kind()) }

	fn numeric_mismatch(&self, operation: &'static str, right: &Self) -> RuntimeFault {
		mismatch(operation, "two Integers or two Decimals", self.pair_kind(right))
	}
}

pub(super) fn mismatch(operation: &'static str, expected: &'static str, found: std::string::String) -> RuntimeFault {
	RuntimeFault::TypeMismatch { operation, expected, found }
}

/// `left / right` at `left`'s scale, rounded half to even. `right` must be non-zero.
fn divide_decimal(left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
	let (numerator, scale) = left.as_bigint_and_exponent();
	let (denominator, right_scale) = right.as_bigint_and_exponent();
	let shift = pow(BigInt::from(10u8), right_scale.unsigned_abs() as usize);
	let (numerator, denominator) =
		if right_scale >= 0 { (numerator * shift, denominator) } else { (numerator, denominator * shift) };
	BigDecimal::new(round_half_even(&numerator, &denominator), scale)
}

fn round_half_even(numerator: &BigInt, denominator: &BigInt) -> BigInt {
	let (quotient, remainder) = numerator.div_rem(denominator);
	if remainder.is_zero() {
		return quotient;
	}
	let away = if numerator.is_negative() != denominator.is_negative() { -1 } else { 1 };
	match (remainder.abs() * 2u8).cmp(&denominator.abs()) {
		Ordering::Less => quotient,
		Ordering::Greater => quotient + away,
		Ordering::Equal if quotient.is_odd() => quotient + away,
		Ordering::Equal => quotient,
	}
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	fn decimal(text: &str) -> Value { Decimal(BigDecimal::from_str(text).unwrap()) }

	fn divide_text(left: &str, right: &str) -> std::string::String {
		decimal(left).divide(&decimal(right)).unwrap().to_string()
	}

	#[test]
	fn integer_division_truncates() {
		assert_eq!(Value::from(7).divide(&Value::from(2)), Ok(Value::from(3)));
		assert_eq!(Value::from(-7).divide(&Value::from(2)), Ok(Value::from(-3)));
		assert_eq!(Value::from(7).divide(&Value::from(0)), Err(RuntimeFault::DivisionByZero));
	}

	#[test]
	fn decimal_division_keeps_left_scale() {
		assert_eq!(divide_text("7.0", "2.0"), "3.5");
		assert_eq!(divide_text("1.0", "3.0"), "0.3");
		assert_eq!(divide_text("2.00", "3"), "0.67");
		assert_eq!(divide_text("-1.0", "3.0"), "-0.3");
		assert_eq!(divide_text("10", "4"), "2");
		assert_eq!(divide_text("1.0", "0.5"), "2.0");
		assert_eq!(decimal("1.0").divide(&decimal("0.00")), Err(RuntimeFault::DivisionByZero));
	}

	#[test]
	fn decimal_division_rounds_half_to_even() {
		assert_eq!(divide_text("0.5", "2"), "0.2");
		assert_eq!(divide_text("1.5", "2"), "0.8");
		assert_eq!(divide_text("-0.5", "2"), "-0.2");
		assert_eq!(divide_text("-1.5", "2"), "-0.8");
	}

	#[test]
	fn concatenation_uses_textual_form() {
		assert_eq!(Value::from("a").add(&Value::from(1)), Ok(Value::from("a1")));
		assert_eq!(Value::from(1).add(&Value::from("a")), Ok(Value::from("1a")));
		assert_eq!(Value::Nil.add(&Value::from("!")), Ok(Value::from("NIL!")));
		assert_eq!(decimal("1.50").add(&Value::from("")), Ok(Value::from("1.50")));
	}

	#[test]
	fn arithmetic_requires_same_kind() {
		assert_eq!(Value::from(2).multiply(&Value::from(3)), Ok(Value::from(6)));
		assert_eq!(decimal("1.5").subtract(&decimal("0.25")), Ok(decimal("1.25")));
		assert!(matches!(Value::from(1).add(&decimal("1.0")), Err(RuntimeFault::TypeMismatch { operation: "+", .. })));
		assert!(Value::from(true).subtract(&Value::from(false)).is_err());
	}

	#[test]
	fn equality() {
		assert_eq!(Value::Nil, Value::Nil);
		assert_ne!(decimal("1.0"), decimal("1.00"));
		assert_eq!(decimal("1.50"), decimal("1.50"));
		assert_eq!(decimal("1.0").compare(&decimal("1.00"), "<"), Ok(Ordering::Equal));
		assert_ne!(Value::from(1), decimal("1"));
		assert_ne!(Value::from("a"), Character('a'));
		let object = RcCell::new(instance::Object::new("Point"));
		assert_eq!(Object(object.clone()), Object(object));
		assert_ne!(Object(RcCell::new(instance::Object::new("Point"))), Object(RcCell::new(instance::Object::new("Point"))));
	}

	#[test]
	fn comparison() {
		assert_eq!(Value::from(1).compare(&Value::from(2), "<"), Ok(Ordering::Less));
		assert_eq!(decimal("2.0").compare(&decimal("1.99"), ">"), Ok(Ordering::Greater));
		assert_eq!(Value::from("b").compare(&Value::from("a"), ">"), Ok(Ordering::Greater));
		assert_eq!(Value::from(false).compare(&Value::from(true), "<"), Ok(Ordering::Less));
		assert!(Value::from(1).compare(&decimal("1.0"), "<").is_err());
		assert!(Value::Nil.compare(&Value::Nil, "<").is_err());
	}

	#[test]
	fn textual_form() {
		assert_eq!(Value::Nil.to_string(), "NIL");
		assert_eq!(Value::from(true).to_string(), "true");
		assert_eq!(Character('x').to_string(), "x");
		assert_eq!([1, 2, 3].into_iter().map(Value::from).collect::<Value>().to_string(), "[1, 2, 3]");
	}
}
