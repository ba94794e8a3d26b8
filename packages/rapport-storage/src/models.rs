use time::OffsetDateTime;
use uuid::Uuid;

use rapport_domain::{Basis, BasisSet, MatchPanels, RawProfile, ScoredMatch, Weights};

#[derive(Debug, sqlx::FromRow)]
pub struct ParticipantRow {
	pub event_id: Uuid,
	pub user_id: Uuid,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub job_title: Option<String>,
	pub company: Option<String>,
	pub what_you_do: Option<String>,
	pub location: Option<String>,
	pub mbti: Option<String>,
	pub enneagram: Option<String>,
	pub networking_goals: Option<Vec<String>>,
	pub hobbies: Option<Vec<String>>,
	pub expertise: Option<Vec<String>>,
	pub updated_at: OffsetDateTime,
}
impl From<ParticipantRow> for RawProfile {
	fn from(row: ParticipantRow) -> Self {
		Self {
			user_id: row.user_id,
			first_name: row.first_name,
			last_name: row.last_name,
			job_title: row.job_title,
			company: row.company,
			what_you_do: row.what_you_do,
			location: row.location,
			mbti: row.mbti,
			enneagram: row.enneagram,
			networking_goals: row.networking_goals,
			hobbies: row.hobbies,
			expertise: row.expertise,
		}
	}
}

/// Per-event weight overrides. A null column keeps the configured default.
#[derive(Debug, Default, sqlx::FromRow)]
pub struct EventWeightsRow {
	pub weight_goals: Option<f32>,
	pub weight_career: Option<f32>,
	pub weight_personality: Option<f32>,
	pub weight_interests: Option<f32>,
}
impl EventWeightsRow {
	pub fn resolve(&self, defaults: Weights) -> Weights {
		Weights {
			goals: self.weight_goals.unwrap_or(defaults.goals),
			career: self.weight_career.unwrap_or(defaults.career),
			personality: self.weight_personality.unwrap_or(defaults.personality),
			interests: self.weight_interests.unwrap_or(defaults.interests),
		}
		.sanitized()
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct MatchRow {
	pub event_id: Uuid,
	pub user_a: Uuid,
	pub user_b: Uuid,
	pub score: f32,
	pub bases: Vec<String>,
	pub summary: String,
	pub why_meet: String,
	pub shared_activities: Vec<String>,
	pub dive_deeper: String,
	pub updated_at: OffsetDateTime,
}
impl MatchRow {
	/// The other side of the pair as seen from `user_id`.
	pub fn counterpart(&self, user_id: Uuid) -> Uuid {
		if self.user_a == user_id { self.user_b } else { self.user_a }
	}

	/// Stored labels outside the closed basis set are dropped.
	pub fn basis_set(&self) -> BasisSet {
		self.bases.iter().filter_map(|label| label.parse::<Basis>().ok()).collect()
	}

	pub fn to_scored(&self, user_id: Uuid) -> ScoredMatch {
		ScoredMatch {
			candidate_id: self.counterpart(user_id),
			score: self.score,
			bases: self.basis_set(),
		}
	}

	pub fn panels(&self) -> MatchPanels {
		MatchPanels {
			summary: self.summary.clone(),
			why_meet: self.why_meet.clone(),
			shared_activities: self.shared_activities.clone(),
			dive_deeper: self.dive_deeper.clone(),
		}
	}
}

/// One kept pair ready to be written for a participant.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMatch {
	pub candidate_id: Uuid,
	pub score: f32,
	pub bases: BasisSet,
	pub panels: MatchPanels,
}
impl NewMatch {
	/// Orders the pair so the smaller id is always `user_a`.
	pub fn ordered_pair(&self, user_id: Uuid) -> (Uuid, Uuid) {
		if user_id < self.candidate_id {
			(user_id, self.candidate_id)
		} else {
			(self.candidate_id, user_id)
		}
	}
}
