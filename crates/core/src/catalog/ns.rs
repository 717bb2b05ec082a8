use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A fully qualified collection name.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Namespace {
	pub database: String,
	pub collection: String,
}

impl Namespace {
	pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
		Self {
			database: database.into(),
			collection: collection.into(),
		}
	}
}

impl Display for Namespace {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}.{}", self.database, self.collection)
	}
}
