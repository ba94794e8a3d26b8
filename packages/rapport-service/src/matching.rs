use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
	RapportService, Result,
	cache,
	narrative::{GeneratedNarrative, NarrativeOutcome, NarrativePipeline},
};
use rapport_domain::{
	BasisSet, ProfileData, RankOptions, ScoredMatch, apply_bump_rule, has_changed, rank_with,
	scoring,
};
use rapport_storage::models::NewMatch;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParticipantOutcome {
	/// The match set was rewritten.
	Updated { matches: usize, fallbacks: usize, version: i64 },
	/// The stored set survived the bump rule; nothing was written.
	Unchanged { matches: usize },
	/// The participant has no profile in this event.
	Skipped,
}

impl RapportService {
	/// Re-ranks one participant and replaces their stored matches when the bump rule picks a
	/// different set. Runs for the same participant are serialized.
	pub async fn match_participant(
		&self,
		event_id: Uuid,
		user_id: Uuid,
	) -> Result<ParticipantOutcome> {
		let _guard = self.locks.acquire(event_id, user_id).await;
		let Some(me) = self.store.profile(event_id, user_id).await? else {
			tracing::warn!(%event_id, %user_id, "Participant profile not found. Skipping.");

			return Ok(ParticipantOutcome::Skipped);
		};
		let roster = self.store.event_profiles(event_id).await?;

		self.match_with_roster(event_id, &me, &roster).await
	}

	pub(crate) async fn match_with_roster(
		&self,
		event_id: Uuid,
		me: &ProfileData,
		roster: &[ProfileData],
	) -> Result<ParticipantOutcome> {
		let weights = self.store.event_weights(event_id, self.settings.rank.weights).await?;
		let options = RankOptions { weights, ..self.settings.rank };
		let incoming = rank_with(me, roster, &options);
		let stored = self.store.current_matches(event_id, me.id).await?;
		let by_id: HashMap<Uuid, &ProfileData> =
			roster.iter().map(|profile| (profile.id, profile)).collect();
		// Stored pairs whose candidate left the roster cannot be kept.
		let current: Vec<ScoredMatch> = stored
			.iter()
			.filter(|entry| entry.candidate_id != me.id && by_id.contains_key(&entry.candidate_id))
			.cloned()
			.collect();
		let merged = apply_bump_rule(&current, &incoming, options.top_k);

		if !has_changed(&stored, &merged) {
			tracing::debug!(
				%event_id,
				user_id = %me.id,
				matches = stored.len(),
				"Stored match set kept."
			);

			return Ok(ParticipantOutcome::Unchanged { matches: stored.len() });
		}

		let mut rows = Vec::with_capacity(merged.len());
		let mut fallbacks = 0;

		for entry in &merged {
			let Some(them) = by_id.get(&entry.candidate_id).copied() else {
				continue;
			};

			let bases = self.bases_for(me, them, entry, &options);
			let generated = self.narrative(me, them, bases).await;

			if generated.outcome.is_fallback() {
				fallbacks += 1;
			}

			rows.push(NewMatch {
				candidate_id: them.id,
				score: entry.score,
				bases,
				panels: generated.panels,
			});
		}

		let version = self.store.replace_matches(event_id, me.id, &rows, true).await?;

		tracing::info!(
			%event_id,
			user_id = %me.id,
			matches = rows.len(),
			fallbacks,
			version,
			"Participant match set replaced."
		);

		Ok(ParticipantOutcome::Updated { matches: rows.len(), fallbacks, version })
	}

	/// Stored entries can carry an empty basis set after unknown labels were dropped; rescore
	/// those.
	fn bases_for(
		&self,
		me: &ProfileData,
		them: &ProfileData,
		entry: &ScoredMatch,
		options: &RankOptions,
	) -> BasisSet {
		if !entry.bases.is_empty() {
			return entry.bases;
		}

		scoring::score_with_limits(me, them, &options.weights, &options.limits).bases
	}

	async fn narrative(
		&self,
		me: &ProfileData,
		them: &ProfileData,
		bases: BasisSet,
	) -> GeneratedNarrative {
		let key = match cache::build_narrative_cache_key(
			&self.settings.provider,
			me,
			them,
			bases,
			self.settings.rules.min_summary_chars,
		) {
			Ok(key) => Some(key),
			Err(err) => {
				tracing::warn!(error = %err, "Failed to build narrative cache key.");

				None
			},
		};

		if let Some(key) = key.as_deref()
			&& let Some(panels) = self.cache.get(key)
		{
			tracing::debug!(
				user_id = %me.id,
				candidate_id = %them.id,
				cache_key_prefix = cache::cache_key_prefix(key),
				"Narrative cache hit."
			);

			return GeneratedNarrative { panels, outcome: NarrativeOutcome::Cached };
		}

		let pipeline = NarrativePipeline {
			generator: self.generator.as_ref(),
			provider: &self.settings.provider,
			rules: self.settings.rules,
		};
		let generated = pipeline.generate(me, them, bases).await;

		if let Some(key) = key
			&& !generated.outcome.is_fallback()
		{
			self.cache.insert(key, generated.panels.clone());
		}

		generated
	}
}
