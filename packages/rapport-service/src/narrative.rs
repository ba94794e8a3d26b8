//! Draft, validate, repair once, then accept with a soft guard. Any dead end falls back to
//! deterministic panels built from the two profiles.

use serde::Serialize;
use uuid::Uuid;

use crate::TextGenerator;
use rapport_config::LlmProviderConfig;
use rapport_domain::{
	BasisSet, MatchPanels, ProfileData,
	narrative::{self, Field, PanelRules, Violation},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
	NotConfigured,
	ProviderFailed,
	Unparseable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NarrativeOutcome {
	/// First draft passed validation.
	Accepted,
	/// The single repair pass produced valid panels.
	Repaired,
	/// Fields still failing after repair were replaced with fallback text.
	SoftGuarded { fields: Vec<Field> },
	Fallback { reason: FallbackReason },
	Cached,
}
impl NarrativeOutcome {
	pub fn is_fallback(&self) -> bool {
		matches!(self, Self::Fallback { .. })
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedNarrative {
	pub panels: MatchPanels,
	pub outcome: NarrativeOutcome,
}

enum State {
	Draft,
	Validating { raw: String, repaired: bool },
	Repairing { raw: String, draft: Option<MatchPanels>, violations: Vec<Violation> },
	Done(GeneratedNarrative),
}

pub struct NarrativePipeline<'a> {
	pub generator: &'a dyn TextGenerator,
	pub provider: &'a LlmProviderConfig,
	pub rules: PanelRules,
}
impl NarrativePipeline<'_> {
	/// Never fails: provider trouble of any kind ends in fallback panels.
	pub async fn generate(
		&self,
		me: &ProfileData,
		them: &ProfileData,
		bases: BasisSet,
	) -> GeneratedNarrative {
		let fallback = narrative::fallback_panels(me, them, bases);

		if !self.provider.is_configured() {
			tracing::debug!(
				user_id = %me.id,
				candidate_id = %them.id,
				"Narrative provider is not configured. Using fallback panels."
			);

			return done_fallback(fallback, FallbackReason::NotConfigured);
		}

		let mut state = State::Draft;

		loop {
			state = match state {
				State::Draft => {
					let messages =
						narrative::build_generation_messages(me, them, bases, &self.rules);

					match self.generator.complete(self.provider, &messages).await {
						Ok(raw) => State::Validating { raw, repaired: false },
						Err(err) => {
							log_provider_failure(me.id, them.id, "draft", &err);

							State::Done(done_fallback(
								fallback.clone(),
								FallbackReason::ProviderFailed,
							))
						},
					}
				},
				State::Validating { raw, repaired } =>
					self.validate(me.id, them.id, raw, repaired, &fallback),
				State::Repairing { raw, draft, violations } => {
					let messages = narrative::build_repair_messages(&raw, &violations, &self.rules);

					match self.generator.complete(self.provider, &messages).await {
						Ok(raw) => State::Validating { raw, repaired: true },
						Err(err) => {
							log_provider_failure(me.id, them.id, "repair", &err);

							State::Done(match draft {
								Some(draft) => self.guard(draft, &fallback),
								None =>
									done_fallback(fallback.clone(), FallbackReason::ProviderFailed),
							})
						},
					}
				},
				State::Done(generated) => return generated,
			};
		}
	}

	fn validate(
		&self,
		user_id: Uuid,
		candidate_id: Uuid,
		raw: String,
		repaired: bool,
		fallback: &MatchPanels,
	) -> State {
		let Some(panels) = narrative::parse_panels(&raw) else {
			tracing::warn!(%user_id, %candidate_id, repaired, "Narrative output is not a JSON object.");

			if repaired {
				return State::Done(done_fallback(fallback.clone(), FallbackReason::Unparseable));
			}

			return State::Repairing { raw, draft: None, violations: Vec::new() };
		};
		let violations = narrative::validate(&panels, &self.rules);

		if violations.is_empty() {
			let outcome =
				if repaired { NarrativeOutcome::Repaired } else { NarrativeOutcome::Accepted };

			return State::Done(GeneratedNarrative { panels, outcome });
		}

		tracing::info!(
			%user_id,
			%candidate_id,
			repaired,
			violations = violations.len(),
			first = %violations[0],
			"Narrative draft failed validation."
		);

		if repaired {
			return State::Done(self.guard(panels, fallback));
		}

		State::Repairing { raw, draft: Some(panels), violations }
	}

	fn guard(&self, panels: MatchPanels, fallback: &MatchPanels) -> GeneratedNarrative {
		let (panels, fields) = narrative::soft_guard(panels, fallback, &self.rules);

		if fields.is_empty() {
			return GeneratedNarrative { panels, outcome: NarrativeOutcome::Repaired };
		}

		GeneratedNarrative { panels, outcome: NarrativeOutcome::SoftGuarded { fields } }
	}
}

fn done_fallback(panels: MatchPanels, reason: FallbackReason) -> GeneratedNarrative {
	GeneratedNarrative { panels, outcome: NarrativeOutcome::Fallback { reason } }
}

fn log_provider_failure(user_id: Uuid, candidate_id: Uuid, stage: &str, err: &crate::Error) {
	tracing::warn!(%user_id, %candidate_id, stage, error = %err, "Narrative provider call failed.");
}
