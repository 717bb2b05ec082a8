//! Translation of a chunk distribution into split point vocabulary.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::catalog::{
	BoundaryKey, ChunkRange, KeyPatternField, RoutingTable, ShardId, ShardKeyPattern,
};
use crate::err::Error;
use crate::expr::FieldPath;

use super::ShardDistributionInfo;

/// Re-expresses every chunk of `table` with the resolved output field names,
/// grouped per owning shard.
///
/// Only boundary field names change, positionally; values, field counts, and
/// the relative chunk order within each shard are preserved exactly, so the
/// translated partitions are a bijection of the source chunk map.
pub(super) fn build(table: &RoutingTable, resolved: &[FieldPath]) -> Result<ShardDistributionInfo> {
	let key_at_split_point = ShardKeyPattern(
		table
			.shard_key
			.iter()
			.zip(resolved)
			.map(|(field, path)| KeyPatternField {
				path: path.clone(),
				direction: field.direction,
			})
			.collect(),
	);
	let mut partitions: BTreeMap<ShardId, Vec<ChunkRange>> = BTreeMap::new();
	for (range, shard) in &table.chunks {
		let translated = ChunkRange {
			min: translate(&range.min, resolved)?,
			max: translate(&range.max, resolved)?,
		};
		partitions.entry(shard.clone()).or_default().push(translated);
	}
	Ok(ShardDistributionInfo {
		key_at_split_point,
		partitions,
	})
}

fn translate(bound: &BoundaryKey, resolved: &[FieldPath]) -> Result<BoundaryKey> {
	if bound.0.len() != resolved.len() {
		// The routing table no longer matches its own shard key pattern.
		return Err(anyhow::Error::new(Error::Unreachable(format!(
			"boundary key {} has {} fields but the shard key resolves {}",
			bound,
			bound.0.len(),
			resolved.len(),
		))));
	}
	Ok(BoundaryKey(
		bound
			.0
			.iter()
			.zip(resolved)
			.map(|((_, value), path)| (path.to_string(), value.clone()))
			.collect(),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::{Epoch, Namespace};
	use crate::val::Value;

	fn range(min: Value, max: Value) -> ChunkRange {
		ChunkRange::new(
			[("word", min)].into_iter().collect(),
			[("word", max)].into_iter().collect(),
		)
	}

	fn table(chunks: Vec<(ChunkRange, ShardId)>) -> RoutingTable {
		RoutingTable {
			namespace: Namespace::new("test", "out_coll"),
			epoch: Epoch::new(),
			shard_key: ShardKeyPattern::ascending(["word"]),
			chunks,
		}
	}

	#[test]
	fn renames_boundaries_and_groups_by_shard() {
		let table = table(vec![
			(range(Value::MinKey, Value::from("hello")), ShardId::from("0")),
			(range(Value::from("hello"), Value::from("world")), ShardId::from("1")),
			(range(Value::from("world"), Value::MaxKey), ShardId::from("1")),
		]);
		let resolved = [FieldPath::from("_id")];

		let distribution = build(&table, &resolved).unwrap();
		assert_eq!(distribution.key_at_split_point, ShardKeyPattern::ascending(["_id"]));
		assert_eq!(distribution.partitions.len(), 2);
		assert_eq!(
			distribution.partitions[&ShardId::from("0")],
			vec![ChunkRange::new(
				[("_id", Value::MinKey)].into_iter().collect(),
				[("_id", Value::from("hello"))].into_iter().collect(),
			)]
		);
		// Chunk order within the shard follows the source table.
		assert_eq!(
			distribution.partitions[&ShardId::from("1")],
			vec![
				ChunkRange::new(
					[("_id", Value::from("hello"))].into_iter().collect(),
					[("_id", Value::from("world"))].into_iter().collect(),
				),
				ChunkRange::new(
					[("_id", Value::from("world"))].into_iter().collect(),
					[("_id", Value::MaxKey)].into_iter().collect(),
				),
			]
		);
	}

	#[test]
	fn chunk_count_is_preserved() {
		let table = table(vec![
			(range(Value::MinKey, Value::from(0i64)), ShardId::from("0")),
			(range(Value::from(0i64), Value::MaxKey), ShardId::from("1")),
		]);
		let distribution = build(&table, &[FieldPath::from("_id")]).unwrap();
		let total: usize = distribution.partitions.values().map(Vec::len).sum();
		assert_eq!(total, table.chunks.len());
	}

	#[test]
	fn mismatched_boundary_width_is_rejected() {
		let table = table(vec![(range(Value::MinKey, Value::MaxKey), ShardId::from("0"))]);
		let resolved = [FieldPath::from("_id"), FieldPath::from("_id")];
		let err = build(&table, &resolved).unwrap_err();
		assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Unreachable(_))));
	}
}
