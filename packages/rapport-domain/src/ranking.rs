//! Top-K candidate selection and the stability ("bump") rule.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	basis::BasisSet,
	profile::ProfileData,
	scoring::{self, AcceptancePolicy, ScoringLimits, Weights},
};

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ScoredMatch {
	pub candidate_id: Uuid,
	pub score: f32,
	pub bases: BasisSet,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankOptions {
	pub weights: Weights,
	pub limits: ScoringLimits,
	pub acceptance: AcceptancePolicy,
	pub top_k: usize,
}
impl Default for RankOptions {
	fn default() -> Self {
		Self {
			weights: Weights::default(),
			limits: ScoringLimits::default(),
			acceptance: AcceptancePolicy::default(),
			top_k: DEFAULT_TOP_K,
		}
	}
}
impl RankOptions {
	pub fn from_config(cfg: &rapport_config::Matching, weights: Weights) -> Self {
		Self {
			weights,
			limits: cfg.into(),
			acceptance: cfg.acceptance.into(),
			top_k: cfg.top_k as usize,
		}
	}
}

/// Scores `me` against every candidate and keeps the best `k`.
pub fn rank(
	me: &ProfileData,
	candidates: &[ProfileData],
	weights: &Weights,
	k: usize,
) -> Vec<ScoredMatch> {
	rank_with(me, candidates, &RankOptions { weights: *weights, top_k: k, ..Default::default() })
}

pub fn rank_with(
	me: &ProfileData,
	candidates: &[ProfileData],
	options: &RankOptions,
) -> Vec<ScoredMatch> {
	let mut out: Vec<ScoredMatch> = candidates
		.iter()
		.filter(|candidate| candidate.id != me.id)
		.filter_map(|candidate| {
			let pair = scoring::score_with_limits(me, candidate, &options.weights, &options.limits);

			options.acceptance.accepts(&pair).then(|| ScoredMatch {
				candidate_id: candidate.id,
				score: pair.score,
				bases: pair.bases,
			})
		})
		.collect();

	sort_matches(&mut out);
	out.truncate(options.top_k);

	out
}

/// Score descending, then candidate id ascending.
pub fn sort_matches(matches: &mut [ScoredMatch]) {
	matches.sort_by(cmp_matches);
}

fn cmp_matches(a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
	b.score.total_cmp(&a.score).then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

/// Score a new candidate must beat to displace the stored set. An unfilled set has open
/// slots, so any positive score qualifies.
pub fn bump_threshold(current: &[ScoredMatch], k: usize) -> f32 {
	if current.len() < k {
		return 0.0;
	}

	current.iter().map(|entry| entry.score).fold(f32::INFINITY, f32::min)
}

/// Replaces `current` only when `incoming` holds something strictly better than its weakest
/// entry; otherwise returns `current` as stored.
pub fn apply_bump_rule(
	current: &[ScoredMatch],
	incoming: &[ScoredMatch],
	k: usize,
) -> Vec<ScoredMatch> {
	let mut stored = current.to_vec();

	sort_matches(&mut stored);

	let threshold = bump_threshold(&stored, k);
	let best_incoming = incoming.iter().map(|entry| entry.score).fold(f32::NEG_INFINITY, f32::max);

	if incoming.is_empty() || best_incoming <= threshold {
		return stored;
	}

	let mut by_candidate: HashMap<Uuid, ScoredMatch> = HashMap::new();

	for entry in stored.into_iter().chain(incoming.iter().cloned()) {
		match by_candidate.get(&entry.candidate_id) {
			Some(existing) if existing.score > entry.score => {},
			_ => {
				by_candidate.insert(entry.candidate_id, entry);
			},
		}
	}

	let mut merged: Vec<ScoredMatch> = by_candidate.into_values().collect();

	sort_matches(&mut merged);
	merged.truncate(k);

	merged
}

/// True when the lists differ in length or in their ordered candidate ids.
pub fn has_changed(old: &[ScoredMatch], new: &[ScoredMatch]) -> bool {
	old.len() != new.len()
		|| old.iter().zip(new).any(|(before, after)| before.candidate_id != after.candidate_id)
}
