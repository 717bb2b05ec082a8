//! Read-only views of cluster metadata.
//!
//! The planner never mutates routing state; it consumes one consistent
//! snapshot per eligibility check through the [`RoutingProvider`] seam.

mod ns;
mod routing;

pub use ns::Namespace;
pub use routing::{
	BoundaryKey, ChunkRange, Direction, Epoch, KeyPatternField, Resolution, RoutingProvider,
	RoutingTable, ShardId, ShardKeyPattern,
};
