use std::{cell::{Ref, RefCell, RefMut}, rc::Rc};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, pow};

#[derive(Debug, Default)]
pub struct RcCell<T> {
	inner: Rc<RefCell<T>>,
}

impl<T> Clone for RcCell<T> {
	fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T> RcCell<T> {
	pub fn new(value: T) -> Self { Self { inner: Rc::new(RefCell::new(value)) } }

	pub fn borrow(&self) -> Ref<'_, T> { self.inner.borrow() }

	pub fn borrow_mut(&self) -> RefMut<'_, T> { self.inner.borrow_mut() }

	/// Identity comparison: both handles point at the same cell.
	pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }
}

impl<T> From<T> for RcCell<T> {
	fn from(value: T) -> Self { Self::new(value) }
}

/// Formats a decimal without exponent notation, keeping its scale (`1.50` stays `1.50`).
pub fn plain_decimal(value: &BigDecimal) -> String {
	let (digits, scale) = value.as_bigint_and_exponent();
	if scale <= 0 {
		return (digits * pow(BigInt::from(10u8), scale.unsigned_abs() as usize)).to_string();
	}
	let scale = scale.unsigned_abs() as usize;
	let mut text = digits.magnitude().to_string();
	if text.len() <= scale {
		text.insert_str(0, &"0".repeat(scale - text.len() + 1));
	}
	text.insert(text.len() - scale, '.');
	if digits.is_negative() {
		text.insert(0, '-');
	}
	text
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	fn plain(input: &str) -> String { plain_decimal(&BigDecimal::from_str(input).unwrap()) }

	#[test]
	fn plain_decimal_keeps_scale() {
		assert_eq!(plain("1.50"), "1.50");
		assert_eq!(plain("-0.001"), "-0.001");
		assert_eq!(plain("0.0000001"), "0.0000001");
		assert_eq!(plain("123.0"), "123.0");
	}

	#[test]
	fn plain_decimal_negative_scale() {
		assert_eq!(plain_decimal(&BigDecimal::new(BigInt::from(12), -3)), "12000");
	}

	#[test]
	fn rc_cell_identity() {
		let a = RcCell::new(1);
		let b = a.clone();
		assert!(a.ptr_eq(&b));
		assert!(!a.ptr_eq(&RcCell::new(1)));
		*b.borrow_mut() = 2;
		assert_eq!(*a.borrow(), 2);
	}
}
