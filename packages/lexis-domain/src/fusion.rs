//! Reciprocal Rank Fusion over ranked document lists.
//!
//! `score(d) = Σ 1 / (k + rank_i(d))` across every list containing `d`, with 1-based ranks.

use std::{
	cmp::Ordering,
	collections::{HashMap, HashSet},
};

use crate::document::ScoredDocument;

pub const DEFAULT_K: u32 = 60;

struct FusedEntry {
	document: ScoredDocument,
	score: f64,
	best_rank: usize,
	first_list: usize,
}

pub fn fuse(list_a: &[ScoredDocument], list_b: &[ScoredDocument], k: u32) -> Vec<ScoredDocument> {
	fuse_multi_source(&[list_a, list_b], k)
}

/// Fuses any number of ranked lists. The payload kept for a document is the one from the first
/// list that contains it; inputs are left untouched.
pub fn fuse_multi_source(lists: &[&[ScoredDocument]], k: u32) -> Vec<ScoredDocument> {
	let mut entries: Vec<FusedEntry> = Vec::new();
	let mut index_by_id: HashMap<&str, usize> = HashMap::new();

	for (list_idx, list) in lists.iter().enumerate() {
		let mut seen_in_list: HashSet<&str> = HashSet::new();

		for (position, document) in list.iter().enumerate() {
			if !seen_in_list.insert(document.id.as_str()) {
				continue;
			}

			let rank = position + 1;
			let contribution = 1.0 / (f64::from(k) + rank as f64);

			match index_by_id.get(document.id.as_str()) {
				Some(&idx) => {
					let entry = &mut entries[idx];

					entry.score += contribution;
					entry.best_rank = entry.best_rank.min(rank);
				},
				None => {
					index_by_id.insert(document.id.as_str(), entries.len());
					entries.push(FusedEntry {
						document: document.clone(),
						score: contribution,
						best_rank: rank,
						first_list: list_idx,
					});
				},
			}
		}
	}

	entries.sort_by(cmp_entries);

	entries
		.into_iter()
		.map(|entry| {
			let mut document = entry.document;

			document.score = entry.score as f32;

			document
		})
		.collect()
}

fn cmp_entries(a: &FusedEntry, b: &FusedEntry) -> Ordering {
	b.score
		.total_cmp(&a.score)
		.then_with(|| a.best_rank.cmp(&b.best_rank))
		.then_with(|| a.first_list.cmp(&b.first_list))
		.then_with(|| a.document.id.cmp(&b.document.id))
}
