//! Narrative panels attached to a displayed match, and the rules they must satisfy.

pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod rules;

use serde::{Deserialize, Serialize};

pub use fallback::fallback_panels;
pub use parse::parse_panels;
pub use prompt::{build_generation_messages, build_repair_messages};
pub use rules::{Field, PanelRules, Violation, soft_guard, validate};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchPanels {
	/// Exactly one sentence.
	pub summary: String,
	/// Three to four sentences.
	pub why_meet: String,
	/// Two to three pair-specific suggestions, each a full sentence.
	pub shared_activities: Vec<String>,
	/// One open, personal question.
	pub dive_deeper: String,
}
