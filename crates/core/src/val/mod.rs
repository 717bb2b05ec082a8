//! The scalar value model for chunk boundary keys.
//!
//! Boundary keys only ever hold comparable scalars, so this is a deliberately
//! small slice of the full document value model. The ordering across variant
//! types mirrors the canonical type order of the document model, with the two
//! sentinel keys bracketing everything else.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A numeric boundary value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Number {
	Int(i64),
	Float(f64),
}

impl Number {
	fn as_float(self) -> f64 {
		match self {
			Self::Int(v) => v as f64,
			Self::Float(v) => v,
		}
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Number {}

impl PartialOrd for Number {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Number {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a.cmp(b),
			(a, b) => a.as_float().total_cmp(&b.as_float()),
		}
	}
}

impl Display for Number {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Int(v) => Display::fmt(v, f),
			Self::Float(v) => Display::fmt(v, f),
		}
	}
}

/// A scalar allowed to appear in a chunk boundary key.
///
/// The declaration order is the comparison order:
/// `MinKey < Null < Number < String < Bool < MaxKey`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
	/// Sorts before every other value; the open lower end of key space.
	MinKey,
	Null,
	Number(Number),
	String(String),
	Bool(bool),
	/// Sorts after every other value; the open upper end of key space.
	MaxKey,
}

impl Value {
	/// The rank of this value's type in the canonical type order.
	const fn type_rank(&self) -> u8 {
		match self {
			Self::MinKey => 0,
			Self::Null => 1,
			Self::Number(_) => 2,
			Self::String(_) => 3,
			Self::Bool(_) => 4,
			Self::MaxKey => 5,
		}
	}
}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Value {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Self::Number(a), Self::Number(b)) => a.cmp(b),
			(Self::String(a), Self::String(b)) => a.cmp(b),
			(Self::Bool(a), Self::Bool(b)) => a.cmp(b),
			(a, b) => a.type_rank().cmp(&b.type_rank()),
		}
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Number(Number::Int(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Number(Number::Float(v))
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::String(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::String(v)
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::MinKey => f.write_str("MinKey"),
			Self::Null => f.write_str("NULL"),
			Self::Number(v) => Display::fmt(v, f),
			Self::String(v) => write!(f, "'{v}'"),
			Self::Bool(v) => Display::fmt(v, f),
			Self::MaxKey => f.write_str("MaxKey"),
		}
	}
}
