use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::narrative::MatchPanels;

/// Corporate jargon that must not appear in any panel, matched as case-insensitive substrings.
pub const BANNED_TERMS: &[&str] = &[
	"synergy",
	"synergies",
	"synergize",
	"leverage",
	"circle back",
	"touch base",
	"low-hanging fruit",
	"move the needle",
	"paradigm",
	"game changer",
	"game-changer",
	"thought leader",
	"deep dive",
	"win-win",
	"value-add",
	"value proposition",
	"bandwidth",
	"best-in-class",
	"disrupt",
	"holistic",
	"ecosystem",
	"ideate",
	"actionable",
	"mission-critical",
	"core competency",
	"boil the ocean",
];

/// Suggestions too generic to count as pair-specific activities.
pub const GENERIC_ACTIVITY_PATTERNS: &[&str] = &[
	r"(?i)\b(grab|get|have|share)\s+(a\s+)?(coffee|coffees|drink|drinks|lunch|a\s+bite)\b",
	r"(?i)\bexchange\s+(contact|contacts|business\s+cards|numbers|info)\b",
	r"(?i)\bconnect\s+on\s+linkedin\b",
	r"(?i)\b(follow|add)\s+each\s+other\b",
	r"(?i)\bchat\s+(at|during)\s+the\s+event\b",
	r"(?i)\bnetwork(ing)?\s+together\b",
	r"(?i)\battend\s+(the\s+)?(next\s+)?(event|meetup|session)s?\s+together\b",
	r"(?i)\b(keep|stay)\s+in\s+touch\b",
	r"(?i)\bschedule\s+a\s+(call|meeting)\b",
];

pub const MIN_SUMMARY_CHARS: usize = 20;

static GENERIC_ACTIVITY_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	GENERIC_ACTIVITY_PATTERNS.iter().filter_map(|pattern| Regex::new(pattern).ok()).collect()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelRules {
	pub min_summary_chars: usize,
}
impl Default for PanelRules {
	fn default() -> Self {
		Self { min_summary_chars: MIN_SUMMARY_CHARS }
	}
}
impl From<&rapport_config::Narrative> for PanelRules {
	fn from(cfg: &rapport_config::Narrative) -> Self {
		Self { min_summary_chars: cfg.min_summary_chars as usize }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
	Summary,
	WhyMeet,
	SharedActivities,
	DiveDeeper,
}
impl Field {
	pub const ALL: [Field; 4] = [Self::Summary, Self::WhyMeet, Self::SharedActivities, Self::DiveDeeper];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Summary => "summary",
			Self::WhyMeet => "why_meet",
			Self::SharedActivities => "shared_activities",
			Self::DiveDeeper => "dive_deeper",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
	Empty { field: Field },
	SummarySentences { found: usize },
	SummaryTooShort { chars: usize, min: usize },
	WhyMeetSentences { found: usize },
	ActivityCount { found: usize },
	ActivityUnterminated { index: usize },
	GenericActivity { index: usize },
	DiveDeeperNotQuestion,
	BannedTerm { field: Field, term: &'static str },
}
impl Violation {
	pub fn field(&self) -> Field {
		match self {
			Self::Empty { field } | Self::BannedTerm { field, .. } => *field,
			Self::SummarySentences { .. } | Self::SummaryTooShort { .. } => Field::Summary,
			Self::WhyMeetSentences { .. } => Field::WhyMeet,
			Self::ActivityCount { .. }
			| Self::ActivityUnterminated { .. }
			| Self::GenericActivity { .. } => Field::SharedActivities,
			Self::DiveDeeperNotQuestion => Field::DiveDeeper,
		}
	}
}
impl fmt::Display for Violation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty { field } => write!(f, "{} must not be empty.", field.as_str()),
			Self::SummarySentences { found } =>
				write!(f, "summary must be exactly one sentence, found {found}."),
			Self::SummaryTooShort { chars, min } =>
				write!(f, "summary must be longer than {min} characters, found {chars}."),
			Self::WhyMeetSentences { found } =>
				write!(f, "why_meet must be 3 to 4 sentences, found {found}."),
			Self::ActivityCount { found } =>
				write!(f, "shared_activities must have 2 to 3 entries, found {found}."),
			Self::ActivityUnterminated { index } => write!(
				f,
				"shared_activities[{index}] must be a full sentence ending in terminal punctuation."
			),
			Self::GenericActivity { index } => write!(
				f,
				"shared_activities[{index}] is a generic suggestion; make it specific to this pair."
			),
			Self::DiveDeeperNotQuestion =>
				write!(f, "dive_deeper must be one open, personal question ending in '?'."),
			Self::BannedTerm { field, term } =>
				write!(f, "{} uses the banned term {term:?}.", field.as_str()),
		}
	}
}

fn is_terminal(ch: char) -> bool {
	matches!(ch, '.' | '!' | '?')
}

fn is_closer(ch: char) -> bool {
	matches!(ch, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

/// Splits on terminal punctuation followed by whitespace or the end of the text. A trailing
/// fragment without punctuation is returned as its own sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
	let chars: Vec<char> = text.trim().chars().collect();
	let mut out = Vec::new();
	let mut current = String::new();
	let mut idx = 0;

	while idx < chars.len() {
		let ch = chars[idx];

		current.push(ch);

		idx += 1;

		if !is_terminal(ch) {
			continue;
		}

		while idx < chars.len() && (is_terminal(chars[idx]) || is_closer(chars[idx])) {
			current.push(chars[idx]);

			idx += 1;
		}

		if idx == chars.len() || chars[idx].is_whitespace() {
			let sentence = current.trim();

			if !sentence.is_empty() {
				out.push(sentence.to_string());
			}

			current.clear();
		}
	}

	let rest = current.trim();

	if !rest.is_empty() {
		out.push(rest.to_string());
	}

	out
}

pub fn count_sentences(text: &str) -> usize {
	split_sentences(text).len()
}

pub fn ends_with_terminal(text: &str) -> bool {
	text.trim().trim_end_matches(is_closer).chars().last().map(is_terminal).unwrap_or(false)
}

pub fn ends_with_question(text: &str) -> bool {
	text.trim().trim_end_matches(is_closer).ends_with('?')
}

pub fn find_banned_term(text: &str) -> Option<&'static str> {
	let lowered = text.to_lowercase();

	BANNED_TERMS.iter().copied().find(|term| lowered.contains(term))
}

pub fn is_generic_activity(text: &str) -> bool {
	GENERIC_ACTIVITY_REGEXES.iter().any(|re| re.is_match(text))
}

pub fn validate(panels: &MatchPanels, rules: &PanelRules) -> Vec<Violation> {
	let mut out = Vec::new();

	validate_summary(&panels.summary, rules, &mut out);
	validate_why_meet(&panels.why_meet, &mut out);
	validate_activities(&panels.shared_activities, &mut out);
	validate_dive_deeper(&panels.dive_deeper, &mut out);

	for field in Field::ALL {
		let term = match field {
			Field::Summary => find_banned_term(&panels.summary),
			Field::WhyMeet => find_banned_term(&panels.why_meet),
			Field::SharedActivities =>
				panels.shared_activities.iter().find_map(|activity| find_banned_term(activity)),
			Field::DiveDeeper => find_banned_term(&panels.dive_deeper),
		};

		if let Some(term) = term {
			out.push(Violation::BannedTerm { field, term });
		}
	}

	out
}

fn validate_summary(summary: &str, rules: &PanelRules, out: &mut Vec<Violation>) {
	if summary.trim().is_empty() {
		out.push(Violation::Empty { field: Field::Summary });

		return;
	}

	let found = count_sentences(summary);

	if found != 1 || !ends_with_terminal(summary) {
		out.push(Violation::SummarySentences { found });
	}

	let chars = summary.trim().chars().count();

	if chars <= rules.min_summary_chars {
		out.push(Violation::SummaryTooShort { chars, min: rules.min_summary_chars });
	}
}

fn validate_why_meet(why_meet: &str, out: &mut Vec<Violation>) {
	if why_meet.trim().is_empty() {
		out.push(Violation::Empty { field: Field::WhyMeet });

		return;
	}

	let found = count_sentences(why_meet);

	if !(3..=4).contains(&found) || !ends_with_terminal(why_meet) {
		out.push(Violation::WhyMeetSentences { found });
	}
}

fn validate_activities(activities: &[String], out: &mut Vec<Violation>) {
	let present: Vec<&String> =
		activities.iter().filter(|activity| !activity.trim().is_empty()).collect();

	if present.is_empty() {
		out.push(Violation::Empty { field: Field::SharedActivities });

		return;
	}
	if !(2..=3).contains(&activities.len()) || present.len() != activities.len() {
		out.push(Violation::ActivityCount { found: present.len() });
	}

	for (index, activity) in activities.iter().enumerate() {
		if !ends_with_terminal(activity) {
			out.push(Violation::ActivityUnterminated { index });
		}
		if is_generic_activity(activity) {
			out.push(Violation::GenericActivity { index });
		}
	}
}

fn validate_dive_deeper(dive_deeper: &str, out: &mut Vec<Violation>) {
	if dive_deeper.trim().is_empty() {
		out.push(Violation::Empty { field: Field::DiveDeeper });

		return;
	}
	if count_sentences(dive_deeper) == 0 || !ends_with_question(dive_deeper) {
		out.push(Violation::DiveDeeperNotQuestion);
	}
}

/// Replaces every field that still breaks a rule with the matching field of `fallback`.
/// Returns the fields that were replaced.
pub fn soft_guard(
	panels: MatchPanels,
	fallback: &MatchPanels,
	rules: &PanelRules,
) -> (MatchPanels, Vec<Field>) {
	let mut failing: Vec<Field> =
		validate(&panels, rules).iter().map(Violation::field).collect();

	failing.sort();
	failing.dedup();

	let mut guarded = panels;

	for field in &failing {
		match field {
			Field::Summary => guarded.summary = fallback.summary.clone(),
			Field::WhyMeet => guarded.why_meet = fallback.why_meet.clone(),
			Field::SharedActivities =>
				guarded.shared_activities = fallback.shared_activities.clone(),
			Field::DiveDeeper => guarded.dive_deeper = fallback.dive_deeper.clone(),
		}
	}

	(guarded, failing)
}
