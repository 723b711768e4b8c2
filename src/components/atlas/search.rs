//! Free-text search matching against precomputed map search text.

use std::collections::BTreeSet;

use super::types::MapEntity;

/// Whether a non-blank query is in effect.
pub fn is_active(query: &str) -> bool {
	!query.trim().is_empty()
}

/// Case-insensitive token match. Every whitespace-separated token of the
/// query must occur somewhere in `search_text`. A blank query matches all.
pub fn matches(query: &str, search_text: &str) -> bool {
	if !is_active(query) {
		return true;
	}
	let haystack = search_text.to_lowercase();
	query
		.to_lowercase()
		.split_whitespace()
		.all(|token| haystack.contains(token))
}

/// Names of the given maps that match `query`.
///
/// Matching looks only at each map's own search text; a map is never
/// matched through one of its neighbours.
pub fn matched_ids<'a>(
	maps: impl IntoIterator<Item = &'a MapEntity>,
	query: &str,
) -> BTreeSet<String> {
	maps.into_iter()
		.filter(|m| matches(query, m.search_text()))
		.map(|m| m.name.clone())
		.collect()
}
