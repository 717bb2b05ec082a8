//! The pipeline vocabulary the planner analyses.
//!
//! Stage construction and parsing happen upstream; the planner only needs
//! read access to each stage's kind tag and, for projections and groups, the
//! shape of their field expressions.

pub mod path;
pub mod stage;

pub use path::FieldPath;
pub use stage::{
	GroupKey, GroupKeyExpr, Pipeline, Projection, ProjectionExpr, Stage, WriteMode,
};
