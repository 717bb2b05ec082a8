//! Field provenance across a single pipeline stage.
//!
//! The tracker answers one question: is the value under a given output path
//! provably a verbatim copy of the value under some input path of the same
//! stage? Anything weaker than a lossless, order-preserving, non-branching
//! copy is reported as unknown.

use crate::expr::{FieldPath, GroupKey, GroupKeyExpr, Projection, ProjectionExpr, Stage};

/// Resolves `path`, meaningful after `stage`, to the path which holds the
/// same value before the stage.
///
/// `None` means the copy cannot be proven: the field may be computed,
/// defaulted, dropped, or reached through a value that could be an array.
pub(super) fn renamed_before(stage: &Stage, path: &FieldPath) -> Option<FieldPath> {
	match stage {
		Stage::Project(projection) => project_source(projection, path),
		Stage::Group {
			key,
			doing_merge,
		} => group_source(key, *doing_merge, path),
		// A match drops documents but never reshapes the survivors.
		Stage::Match => Some(path.clone()),
		// These force a single merger; the walker rejects them before
		// provenance is ever consulted.
		Stage::Sort | Stage::Limit(_) | Stage::Out { .. } | Stage::Other(_) => None,
	}
}

fn project_source(projection: &Projection, path: &FieldPath) -> Option<FieldPath> {
	// An entry whose output side is exactly the requested path.
	if let Some(expr) = projection.entry(&path.to_string()) {
		return match expr {
			ProjectionExpr::Include => Some(path.clone()),
			// A copy out of a nested field is only a rename when the
			// enclosing value is provably not an array; a dotted access
			// into an array fans out into an array of results. Nothing
			// here can prove that, so only simple sources count.
			ProjectionExpr::Ref(src) if src.is_simple() => Some(src.clone()),
			ProjectionExpr::Ref(_) | ProjectionExpr::Computed | ProjectionExpr::Literal => None,
		};
	}
	// A path inside a projected field. Inclusion keeps the whole subtree
	// verbatim; a renamed parent would need to be a provably non-array
	// scalar for its sub-fields to follow, which this model cannot show.
	for (out, expr) in &projection.0 {
		let out = FieldPath::from(out.as_str());
		if path.is_strict_descendant_of(&out) {
			return match expr {
				ProjectionExpr::Include => Some(path.clone()),
				ProjectionExpr::Ref(_) | ProjectionExpr::Computed | ProjectionExpr::Literal => {
					None
				}
			};
		}
	}
	// `_id` rides along by default unless some entry reshapes it.
	if path.first() == Some("_id") && !projection.touches(&FieldPath::from("_id")) {
		return Some(path.clone());
	}
	None
}

fn group_source(key: &GroupKey, doing_merge: bool, path: &FieldPath) -> Option<FieldPath> {
	// A group emits only its key (under `_id`) and computed aggregates;
	// every other input field is dropped, and aggregates are never copies.
	if path.first() != Some("_id") {
		return None;
	}
	match key {
		GroupKey::Ref(src) => {
			if !path.is_simple() {
				// A dotted look inside a key whose array-ness is unknown.
				return None;
			}
			if doing_merge {
				// The inputs are pre-grouped partials which already carry
				// the key value under `_id`.
				Some(path.clone())
			} else {
				src.is_simple().then(|| src.clone())
			}
		}
		GroupKey::Document(entries) => {
			// The key sub-document is built fresh by this stage, so it is
			// provably not an array and each sub-field maps through its
			// own entry. Deeper paths would dig inside the entry's value,
			// which is as unprovable as any other nested access.
			if path.len() != 2 {
				return None;
			}
			match entries.iter().find(|(name, _)| *name == path[1])? {
				(_, GroupKeyExpr::Ref(_)) if doing_merge => Some(path.clone()),
				(_, GroupKeyExpr::Ref(src)) if src.is_simple() => Some(src.clone()),
				_ => None,
			}
		}
		GroupKey::Computed => None,
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn project<const N: usize>(entries: [(&str, ProjectionExpr); N]) -> Stage {
		Stage::Project(entries.into_iter().collect())
	}

	fn track(stage: &Stage, path: &str) -> Option<String> {
		renamed_before(stage, &FieldPath::from(path)).map(|p| p.to_string())
	}

	#[test]
	fn match_is_a_pass_through() {
		assert_eq!(track(&Stage::Match, "_id"), Some("_id".to_owned()));
		assert_eq!(track(&Stage::Match, "a.b.c"), Some("a.b.c".to_owned()));
	}

	#[test]
	fn project_renames_from_simple_sources() {
		let stage = project([
			("word", ProjectionExpr::Ref(FieldPath::from("_id"))),
			("count", ProjectionExpr::Include),
		]);
		assert_eq!(track(&stage, "word"), Some("_id".to_owned()));
		assert_eq!(track(&stage, "count"), Some("count".to_owned()));
	}

	#[test]
	fn project_breaks_on_dotted_sources() {
		// The parent of a dotted source could be an array, in which case
		// the "copy" is a fan-out, not a rename.
		let stage = project([("_id", ProjectionExpr::Ref(FieldPath::from("_id.country")))]);
		assert_eq!(track(&stage, "_id"), None);
	}

	#[rstest]
	#[case::computed(ProjectionExpr::Computed)]
	#[case::literal(ProjectionExpr::Literal)]
	#[case::renamed(ProjectionExpr::Ref(FieldPath::from("source")))]
	fn project_blocks_descendants_of_rewritten_fields(#[case] expr: ProjectionExpr) {
		let stage = project([("key", expr)]);
		assert_eq!(track(&stage, "key.sub"), None);
	}

	#[test]
	fn project_keeps_included_subtrees() {
		let stage = project([("stats", ProjectionExpr::Include)]);
		assert_eq!(track(&stage, "stats.total"), Some("stats.total".to_owned()));
	}

	#[test]
	fn project_includes_id_by_default() {
		let stage = project([("word", ProjectionExpr::Ref(FieldPath::from("x")))]);
		assert_eq!(track(&stage, "_id"), Some("_id".to_owned()));
		// But not once some entry reshapes it.
		let stage = project([("_id.part", ProjectionExpr::Computed)]);
		assert_eq!(track(&stage, "_id"), None);
	}

	#[test]
	fn project_drops_unmentioned_fields() {
		let stage = project([("kept", ProjectionExpr::Include)]);
		assert_eq!(track(&stage, "dropped"), None);
	}

	#[test]
	fn group_key_tracks_to_its_source_field() {
		let stage = Stage::Group {
			key: GroupKey::Ref(FieldPath::from("x")),
			doing_merge: false,
		};
		assert_eq!(track(&stage, "_id"), Some("x".to_owned()));
		// Aggregate outputs and dropped fields are never copies.
		assert_eq!(track(&stage, "count"), None);
	}

	#[test]
	fn merging_group_keeps_the_key_in_place() {
		let stage = Stage::Group {
			key: GroupKey::Ref(FieldPath::from("x")),
			doing_merge: true,
		};
		assert_eq!(track(&stage, "_id"), Some("_id".to_owned()));
	}

	#[test]
	fn document_group_key_maps_sub_fields() {
		let stage = Stage::Group {
			key: GroupKey::Document(vec![
				("region".to_owned(), GroupKeyExpr::Ref(FieldPath::from("region"))),
				("country".to_owned(), GroupKeyExpr::Ref(FieldPath::from("country"))),
			]),
			doing_merge: false,
		};
		assert_eq!(track(&stage, "_id.region"), Some("region".to_owned()));
		assert_eq!(track(&stage, "_id.country"), Some("country".to_owned()));
		// The composite key as a whole is not a copy of anything.
		assert_eq!(track(&stage, "_id"), None);
		assert_eq!(track(&stage, "_id.region.code"), None);
	}

	#[test]
	fn computed_group_key_breaks_tracking() {
		let stage = Stage::Group {
			key: GroupKey::Computed,
			doing_merge: true,
		};
		assert_eq!(track(&stage, "_id"), None);
	}
}
