use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// A dotted path naming one field of a document.
///
/// Equality is structural; a path is *simple* when it has exactly one
/// component.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
	/// Whether this path has exactly one component.
	pub fn is_simple(&self) -> bool {
		self.0.len() == 1
	}

	/// The first component of the path, if any.
	pub fn first(&self) -> Option<&str> {
		self.0.first().map(String::as_str)
	}

	/// Whether `self` names a field strictly inside the field named by
	/// `other`.
	pub fn is_strict_descendant_of(&self, other: &Self) -> bool {
		self.0.len() > other.0.len() && self.0[..other.0.len()] == other.0[..]
	}
}

impl Deref for FieldPath {
	type Target = [String];
	fn deref(&self) -> &Self::Target {
		self.0.as_slice()
	}
}

impl From<&str> for FieldPath {
	fn from(v: &str) -> Self {
		Self(v.split('.').map(str::to_owned).collect())
	}
}

impl From<String> for FieldPath {
	fn from(v: String) -> Self {
		Self::from(v.as_str())
	}
}

impl Display for FieldPath {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(&self.0.join("."))
	}
}
