//! Exchange-eligibility planning.
//!
//! An *exchange* redistributes the merging half of a sharded aggregation:
//! instead of all partial results converging on one coordinating node, each
//! shard receives the slice of the merge whose output it will own, routed by
//! range over the output collection's shard key. That is only sound when the
//! planner can prove, statically, that every shard key field of the output
//! collection survives the merging pipeline as a verbatim copy, and that no
//! stage in it needs to see the whole stream. Whenever such a proof is out
//! of reach the planner reports ineligibility and the caller falls back to a
//! single-node merge; a wrong answer here would write documents onto shards
//! which do not own their key ranges.

mod partition;
mod rename;
mod walk;

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::{
	ChunkRange, Resolution, RoutingProvider, ShardId, ShardKeyPattern,
};
use crate::expr::{Pipeline, Stage, WriteMode};

/// How exchanged documents are routed to their consumers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ExchangePolicy {
	/// Route each document by locating its key within an ordered set of
	/// boundary ranges.
	Range,
	/// Route each document by a hash of its key. Declared for the
	/// executor's benefit; this planner only ever produces `Range`.
	Hash,
}

/// Which slice of the split point key space each shard consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShardDistributionInfo {
	/// The output collection's shard key, re-expressed in the field names
	/// of the documents entering the merging pipeline.
	pub key_at_split_point: ShardKeyPattern,
	/// Boundary ranges grouped by owning shard. Within each shard the
	/// ranges keep the order of the source routing table's chunks.
	pub partitions: BTreeMap<ShardId, Vec<ChunkRange>>,
}

/// The artifact handed to the exchange executor. Built fresh per
/// eligibility check and consumed immediately; nothing persists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSpec {
	pub policy: ExchangePolicy,
	pub distribution: ShardDistributionInfo,
}

/// Decides whether `pipeline` can run as a range exchange instead of a
/// single-node merge.
///
/// Returns `Ok(None)` for every expected form of ineligibility: no terminal
/// insert-mode out stage, an unsharded or not-yet-created target collection,
/// a stage requiring a single merger, or shard key provenance that cannot be
/// proven. The one failure surfaced as an error is a target namespace whose
/// database does not exist
/// ([`Error::DatabaseNotFound`](crate::err::Error::DatabaseNotFound)),
/// propagated from the routing resolution untranslated.
///
/// The check is reentrant: it holds no shared state, and concurrent checks
/// against the same pipeline need no coordination.
pub async fn check_if_eligible_for_exchange(
	provider: &dyn RoutingProvider,
	pipeline: &Pipeline,
) -> Result<Option<ExchangeSpec>> {
	// The merge can only be repartitioned when its results are inserted
	// into a collection whose distribution already exists. A replacing
	// write ignores the target's current distribution entirely, so there
	// is nothing to align the partitions with.
	let Some(Stage::Out {
		target,
		mode,
	}) = pipeline.last()
	else {
		debug!("Pipeline does not end in an out stage, merge is not exchangeable");
		return Ok(None);
	};
	if *mode != WriteMode::InsertDocuments {
		debug!("Terminal out stage replaces {target}, merge is not exchangeable");
		return Ok(None);
	}
	let table = match provider.resolve(target).await? {
		Resolution::Sharded(table) => table,
		Resolution::Unsharded => {
			// The out stage will create a fresh unsharded collection;
			// there is nothing to partition against yet.
			debug!("Target collection {target} is not sharded, merge is not exchangeable");
			return Ok(None);
		}
	};
	let merging = &pipeline[..pipeline.len() - 1];
	let Some(resolved) = walk::trace_shard_key(merging, &table.shard_key) else {
		debug!("Shard key {} of {target} is not preserved by the pipeline", table.shard_key);
		return Ok(None);
	};
	let distribution = partition::build(&table, &resolved)?;
	trace!(
		"Pipeline is eligible for a range exchange on {}",
		distribution.key_at_split_point
	);
	Ok(Some(ExchangeSpec {
		policy: ExchangePolicy::Range,
		distribution,
	}))
}
