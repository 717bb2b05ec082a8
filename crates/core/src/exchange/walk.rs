//! The backward provenance walk over a merging pipeline.

use crate::catalog::ShardKeyPattern;
use crate::expr::{FieldPath, Stage};

use super::rename;

/// Traces every shard key component backwards through `stages`, tail to
/// head, over an explicit positional worklist.
///
/// On success, returns one resolved path per key component: the field which,
/// in the documents entering the pipeline, provably holds that component's
/// value. Returns `None` as soon as any component's provenance breaks or any
/// stage requires a single merger.
///
/// Components are tracked independently. A compound key whose components
/// resolve to different input fields is accepted positionally; that is only
/// value-correct when every component carries the same underlying value, a
/// known limitation of per-field tracking.
pub(super) fn trace_shard_key(
	stages: &[Stage],
	pattern: &ShardKeyPattern,
) -> Option<Vec<FieldPath>> {
	let mut required: Vec<FieldPath> = pattern.iter().map(|field| field.path.clone()).collect();
	for stage in stages.iter().rev() {
		if stage.requires_single_merger() {
			trace!("Stage ${} forces a single merger", stage.name());
			return None;
		}
		for path in &mut required {
			let Some(source) = rename::renamed_before(stage, path) else {
				trace!("Provenance of '{path}' breaks at a ${} stage", stage.name());
				return None;
			};
			*path = source;
		}
	}
	Some(required)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::{GroupKey, ProjectionExpr};

	fn pattern(fields: &[&str]) -> ShardKeyPattern {
		ShardKeyPattern::ascending(fields.iter().copied())
	}

	fn resolved(paths: Option<Vec<FieldPath>>) -> Option<Vec<String>> {
		paths.map(|paths| paths.iter().map(FieldPath::to_string).collect())
	}

	fn merge_group(key: &str) -> Stage {
		Stage::Group {
			key: GroupKey::Ref(FieldPath::from(key)),
			doing_merge: true,
		}
	}

	fn rename_project(out: &str, src: &str) -> Stage {
		Stage::Project([(out, ProjectionExpr::Ref(FieldPath::from(src)))].into_iter().collect())
	}

	#[test]
	fn empty_pipeline_resolves_to_the_pattern_itself() {
		assert_eq!(
			resolved(trace_shard_key(&[], &pattern(&["_id"]))),
			Some(vec!["_id".to_owned()])
		);
	}

	#[test]
	fn chained_renames_compose_right_to_left() {
		let stages = vec![
			merge_group("x"),
			rename_project("tmp", "_id"),
			rename_project("_id", "tmp"),
		];
		assert_eq!(
			resolved(trace_shard_key(&stages, &pattern(&["_id"]))),
			Some(vec!["_id".to_owned()])
		);
	}

	#[test]
	fn group_resolves_the_key_to_its_input_name() {
		let stages = vec![Stage::Group {
			key: GroupKey::Ref(FieldPath::from("x")),
			doing_merge: false,
		}];
		assert_eq!(
			resolved(trace_shard_key(&stages, &pattern(&["_id"]))),
			Some(vec!["x".to_owned()])
		);
	}

	#[test]
	fn single_merger_stage_fails_the_walk() {
		for blocker in [Stage::Sort, Stage::Limit(6), Stage::Other("unwind".to_owned())] {
			let stages = vec![merge_group("x"), blocker];
			assert_eq!(trace_shard_key(&stages, &pattern(&["_id"])), None);
		}
	}

	#[test]
	fn broken_provenance_fails_the_walk() {
		// `_id` is rebuilt from a dotted sub-path, which is not provably
		// a rename.
		let stages = vec![rename_project("_id", "_id.country")];
		assert_eq!(trace_shard_key(&stages, &pattern(&["_id"])), None);
	}

	#[test]
	fn compound_components_track_independently() {
		let stages = vec![
			merge_group("word"),
			Stage::Project(
				[
					("x", ProjectionExpr::Ref(FieldPath::from("_id"))),
					("y", ProjectionExpr::Ref(FieldPath::from("_id"))),
				]
				.into_iter()
				.collect(),
			),
		];
		assert_eq!(
			resolved(trace_shard_key(&stages, &pattern(&["x", "y"]))),
			Some(vec!["_id".to_owned(), "_id".to_owned()])
		);
	}
}
