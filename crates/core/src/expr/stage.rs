use std::ops::Deref;

use crate::catalog::Namespace;
use crate::expr::FieldPath;

/// The merging half of an aggregation: the ordered stage suffix which runs
/// after per-shard partial results converge. Borrowed immutably by the
/// planner and never modified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline(pub Vec<Stage>);

impl Deref for Pipeline {
	type Target = [Stage];
	fn deref(&self) -> &Self::Target {
		self.0.as_slice()
	}
}

impl From<Vec<Stage>> for Pipeline {
	fn from(v: Vec<Stage>) -> Self {
		Self(v)
	}
}

/// One stage of a merging pipeline.
///
/// This is a closed variant set: any stage kind the planner does not model
/// arrives as [`Stage::Other`] and is treated as requiring a single merger
/// with unknown field provenance. An optimistic default here would let the
/// planner emit an exchange it cannot prove safe.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
	/// A re-aggregation. `doing_merge` marks the merging half of a group
	/// which was split across the shards, whose input is already keyed
	/// partial output.
	Group {
		key: GroupKey,
		doing_merge: bool,
	},
	/// An inclusion-style reshaping of each document.
	Project(Projection),
	/// A filter; drops documents but never reshapes them.
	Match,
	Sort,
	Limit(u64),
	/// The terminal write into another collection.
	Out {
		target: Namespace,
		mode: WriteMode,
	},
	/// A stage kind unknown to the planner.
	Other(String),
}

impl Stage {
	/// Whether this stage forces the whole merge onto a single node.
	///
	/// Such a stage can never sit inside an exchanged pipeline, no matter
	/// how well its fields track.
	pub fn requires_single_merger(&self) -> bool {
		match self {
			Self::Group {
				..
			}
			| Self::Project(_)
			| Self::Match => false,
			Self::Sort | Self::Limit(_) | Self::Out { .. } | Self::Other(_) => true,
		}
	}

	/// The stage's kind tag, for diagnostics.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Group {
				..
			} => "group",
			Self::Project(_) => "project",
			Self::Match => "match",
			Self::Sort => "sort",
			Self::Limit(_) => "limit",
			Self::Out {
				..
			} => "out",
			Self::Other(_) => "other",
		}
	}
}

/// How a terminal [`Stage::Out`] writes into its target collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteMode {
	/// Insert the merged documents into the existing collection.
	InsertDocuments,
	/// Atomically replace the whole collection with the merged output.
	ReplaceCollection,
}

/// The output fields of a projection, in declaration order, each mapped to
/// the expression producing it. Inclusion semantics: input fields not
/// mentioned are dropped, except `_id` which rides along by default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection(pub Vec<(String, ProjectionExpr)>);

impl Projection {
	/// The expression for the output field named exactly `name`, if any.
	pub fn entry(&self, name: &str) -> Option<&ProjectionExpr> {
		self.0.iter().find(|(out, _)| out == name).map(|(_, expr)| expr)
	}

	/// Whether any entry writes to `path` or inside the field it names.
	pub fn touches(&self, path: &FieldPath) -> bool {
		self.0.iter().any(|(out, _)| {
			let out = FieldPath::from(out.as_str());
			out == *path || out.is_strict_descendant_of(path) || path.is_strict_descendant_of(&out)
		})
	}
}

impl<S: Into<String>> FromIterator<(S, ProjectionExpr)> for Projection {
	fn from_iter<I: IntoIterator<Item = (S, ProjectionExpr)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(out, expr)| (out.into(), expr)).collect())
	}
}

/// What one projection entry does to its output field.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionExpr {
	/// Keep the input field of the same name, subtree included.
	Include,
	/// A verbatim copy of one input field.
	Ref(FieldPath),
	/// Any computed expression; its contents are opaque to the planner.
	Computed,
	/// A constant.
	Literal,
}

/// The key expression of a [`Stage::Group`].
#[derive(Clone, Debug, PartialEq)]
pub enum GroupKey {
	/// Grouping on the value of one input field.
	Ref(FieldPath),
	/// Grouping on a sub-document built from named sub-expressions.
	Document(Vec<(String, GroupKeyExpr)>),
	/// Grouping on an arbitrary computed expression.
	Computed,
}

/// One named component of a [`GroupKey::Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum GroupKeyExpr {
	Ref(FieldPath),
	Computed,
}
