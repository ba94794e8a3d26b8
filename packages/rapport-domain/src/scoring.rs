//! Pairwise compatibility scoring.
//!
//! Every rule uses a symmetric overlap test, so `score(a, b)` and `score(b, a)` agree exactly.

use serde::{Deserialize, Serialize};

use crate::{
	basis::{Basis, BasisSet},
	profile::ProfileData,
	text,
};

/// Relative contribution of each signal.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Weights {
	pub goals: f32,
	pub career: f32,
	pub personality: f32,
	pub interests: f32,
}
impl Weights {
	/// Negative or non-finite weights count as zero.
	pub fn sanitized(self) -> Self {
		let clean = |value: f32| if value.is_finite() && value > 0.0 { value } else { 0.0 };

		Self {
			goals: clean(self.goals),
			career: clean(self.career),
			personality: clean(self.personality),
			interests: clean(self.interests),
		}
	}
}
impl Default for Weights {
	fn default() -> Self {
		rapport_config::MatchingWeights::default().into()
	}
}
impl From<rapport_config::MatchingWeights> for Weights {
	fn from(cfg: rapport_config::MatchingWeights) -> Self {
		Self {
			goals: cfg.goals,
			career: cfg.career,
			personality: cfg.personality,
			interests: cfg.interests,
		}
	}
}

/// Caps that stop long lists from dominating a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringLimits {
	pub career_overlap_cap: usize,
	pub interests_cap: usize,
}
impl Default for ScoringLimits {
	fn default() -> Self {
		Self { career_overlap_cap: 3, interests_cap: 3 }
	}
}
impl From<&rapport_config::Matching> for ScoringLimits {
	fn from(cfg: &rapport_config::Matching) -> Self {
		Self {
			career_overlap_cap: cfg.career_overlap_cap as usize,
			interests_cap: cfg.interests_cap as usize,
		}
	}
}

/// Per-signal contributions before summing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
	pub goals: f32,
	pub career: f32,
	pub interests: f32,
	pub personality: f32,
}
impl ScoreBreakdown {
	pub fn total(&self) -> f32 {
		self.goals + self.career + self.interests + self.personality
	}

	/// Contribution credited to a basis. Goal fulfilment counts toward career.
	pub fn basis_score(&self, basis: Basis) -> f32 {
		match basis {
			Basis::Career => self.goals + self.career,
			Basis::Interests => self.interests,
			Basis::Personality => self.personality,
		}
	}

	pub fn bases(&self) -> BasisSet {
		Basis::ALL.into_iter().filter(|basis| self.basis_score(*basis) > 0.0).collect()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PairScore {
	pub score: f32,
	pub bases: BasisSet,
	pub breakdown: ScoreBreakdown,
}

/// Keeps pairs whose score clears a floor and at least one basis that clears its own floor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AcceptancePolicy {
	pub min_total_score: f32,
	pub min_basis_score: f32,
}
impl AcceptancePolicy {
	pub fn accepts(&self, pair: &PairScore) -> bool {
		if pair.score <= 0.0 || pair.bases.is_empty() || pair.score < self.min_total_score {
			return false;
		}

		pair.bases.iter().any(|basis| pair.breakdown.basis_score(basis) >= self.min_basis_score)
	}
}
impl From<rapport_config::MatchingAcceptance> for AcceptancePolicy {
	fn from(cfg: rapport_config::MatchingAcceptance) -> Self {
		Self { min_total_score: cfg.min_total_score, min_basis_score: cfg.min_basis_score }
	}
}

pub fn score(me: &ProfileData, them: &ProfileData, weights: &Weights) -> PairScore {
	score_with_limits(me, them, weights, &ScoringLimits::default())
}

pub fn score_with_limits(
	me: &ProfileData,
	them: &ProfileData,
	weights: &Weights,
	limits: &ScoringLimits,
) -> PairScore {
	let weights = weights.sanitized();
	let breakdown = ScoreBreakdown {
		goals: weights.goals * goals_bridge_overlap(me, them) as f32,
		career: weights.career * career_signal(me, them, limits.career_overlap_cap) as f32,
		interests: weights.interests * interests_signal(me, them, limits.interests_cap) as f32,
		personality: if personality_compatible(me, them) { weights.personality } else { 0.0 },
	};

	PairScore { score: breakdown.total(), bases: breakdown.bases(), breakdown }
}

/// Goal tokens of one side matched against expertise tokens of the other, both directions.
pub fn goals_bridge_overlap(me: &ProfileData, them: &ProfileData) -> usize {
	let forward = text::overlap_count(&me.networking_goals.tokens(), &them.expertise.tokens());
	let backward = text::overlap_count(&them.networking_goals.tokens(), &me.expertise.tokens());

	forward + backward
}

/// Title/company/description token overlap plus one for a related function area, capped.
pub fn career_signal(me: &ProfileData, them: &ProfileData, cap: usize) -> usize {
	let overlap = text::overlap_count(&me.career_tokens(), &them.career_tokens());
	let area = usize::from(me.function_area.is_related(them.function_area));

	(overlap + area).min(cap)
}

pub fn interests_signal(me: &ProfileData, them: &ProfileData, cap: usize) -> usize {
	me.hobbies.keys().intersection(&them.hobbies.keys()).count().min(cap)
}

pub fn personality_compatible(me: &ProfileData, them: &ProfileData) -> bool {
	let types_match = match (&me.mbti, &them.mbti) {
		(Some(mine), Some(theirs)) => mine.shared_letters(theirs) >= 2,
		_ => false,
	};
	let cores_match = match (me.enneagram, them.enneagram) {
		(Some(mine), Some(theirs)) => mine.core == theirs.core,
		_ => false,
	};

	types_match || cores_match
}
