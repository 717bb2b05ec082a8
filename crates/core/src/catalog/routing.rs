use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Namespace;
use crate::expr::FieldPath;
use crate::val::Value;

/// Identifies one shard of the cluster.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ShardId(pub String);

impl From<&str> for ShardId {
	fn from(v: &str) -> Self {
		Self(v.to_owned())
	}
}

impl Display for ShardId {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// An opaque version tag for one routing snapshot. Two tables with the same
/// epoch describe the same chunk layout; a bumped epoch invalidates any
/// ranges derived from the old one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Epoch(Uuid);

impl Epoch {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for Epoch {
	fn default() -> Self {
		Self::new()
	}
}

/// Sort direction of one shard key component.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
	Ascending,
	Descending,
}

impl Display for Direction {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Ascending => f.write_str("1"),
			Self::Descending => f.write_str("-1"),
		}
	}
}

/// One component of a shard key pattern.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KeyPatternField {
	pub path: FieldPath,
	pub direction: Direction,
}

/// The ordered field pattern a collection's documents are partitioned on.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShardKeyPattern(pub Vec<KeyPatternField>);

impl ShardKeyPattern {
	/// A pattern of ascending components, in the given order.
	pub fn ascending<I>(fields: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<FieldPath>,
	{
		Self(
			fields
				.into_iter()
				.map(|path| KeyPatternField {
					path: path.into(),
					direction: Direction::Ascending,
				})
				.collect(),
		)
	}
}

impl Deref for ShardKeyPattern {
	type Target = [KeyPatternField];
	fn deref(&self) -> &Self::Target {
		self.0.as_slice()
	}
}

impl Display for ShardKeyPattern {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("{ ")?;
		for (i, field) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}: {}", field.path, field.direction)?;
		}
		f.write_str(" }")
	}
}

/// A boundary document: ordered field name and value pairs.
///
/// Duplicate field names are legal; they arise when a compound shard key is
/// translated onto fewer distinct output fields.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoundaryKey(pub Vec<(String, Value)>);

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for BoundaryKey {
	fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect())
	}
}

impl Display for BoundaryKey {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("{ ")?;
		for (i, (name, value)) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{name}: {value}")?;
		}
		f.write_str(" }")
	}
}

/// An interval of shard key space: inclusive lower bound, exclusive upper
/// bound. Within one routing table the ranges tile the key space with no
/// gaps or overlaps.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChunkRange {
	pub min: BoundaryKey,
	pub max: BoundaryKey,
}

impl ChunkRange {
	pub fn new(min: BoundaryKey, max: BoundaryKey) -> Self {
		Self {
			min,
			max,
		}
	}
}

impl Display for ChunkRange {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "[{}, {})", self.min, self.max)
	}
}

/// One consistent snapshot of a collection's chunk distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutingTable {
	pub namespace: Namespace,
	pub epoch: Epoch,
	pub shard_key: ShardKeyPattern,
	/// Chunk ownership, ordered by range.
	pub chunks: Vec<(ChunkRange, ShardId)>,
}

/// The outcome of resolving a namespace against the catalog.
#[derive(Clone, Debug)]
pub enum Resolution {
	/// The collection is tracked and its chunks are distributed.
	Sharded(RoutingTable),
	/// The database exists but the collection is untracked, unsharded, or
	/// not yet created.
	Unsharded,
}

/// The source of routing snapshots, injected into the planner so tests can
/// substitute synthetic tables.
///
/// Resolution may fetch or refresh metadata from a remote authority, hence
/// the async seam; the planner awaits exactly one call per eligibility
/// check. Cancellation is the caller's concern.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
	/// Resolve the current routing snapshot for a namespace.
	///
	/// The snapshot must reflect a single epoch for the whole call. A
	/// missing database is reported as [`crate::err::Error::DatabaseNotFound`],
	/// never as an unsharded resolution.
	async fn resolve(&self, ns: &Namespace) -> Result<Resolution>;
}
