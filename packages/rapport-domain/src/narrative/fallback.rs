//! Deterministic panels built from concrete profile values.
//!
//! Used when no provider is configured, when the provider fails, and as the source for
//! soft-guard replacements. Every output passes [`super::validate`] with default rules.

use crate::{
	basis::{Basis, BasisSet},
	narrative::{
		MatchPanels,
		rules::{self, count_sentences, find_banned_term, is_generic_activity},
	},
	profile::{FunctionArea, ProfileData},
	text,
};

const WHY_MEET_PADDING: &[&str] = &[
	"A short conversation is enough to find out where your paths could help each other.",
	"Introductions like this work best when both people come with one concrete question.",
	"Even a few minutes together can turn into a useful follow-up.",
];
const ACTIVITY_PADDING: &[&str] = &[
	"Swap one book, podcast, or newsletter that changed how you work.",
	"Pick one problem each of you is stuck on and sketch a first step together.",
	"Share the most surprising thing you learned this year and why it stuck.",
];

struct Evidence<'a> {
	name: String,
	goal: Option<&'a str>,
	expertise: Option<&'a str>,
	hobby: Option<&'a str>,
	their_title: Option<&'a str>,
	shared_area: Option<FunctionArea>,
	personality: Option<(String, String)>,
}

pub fn fallback_panels(me: &ProfileData, them: &ProfileData, bases: BasisSet) -> MatchPanels {
	let evidence = gather(me, them, bases);

	MatchPanels {
		summary: summary(&evidence),
		why_meet: why_meet(&evidence),
		shared_activities: activities(&evidence),
		dive_deeper: dive_deeper(&evidence),
	}
}

fn gather<'a>(me: &'a ProfileData, them: &'a ProfileData, bases: BasisSet) -> Evidence<'a> {
	let goal = me.networking_goals.iter().find_map(usable);
	let expertise = bridged_expertise(me, them).or_else(|| them.expertise.iter().find_map(usable));
	let hobby = me.hobbies.intersection(&them.hobbies).into_iter().find_map(usable);
	let their_title = them.job_title.as_deref().and_then(usable);
	let shared_area = (bases.contains(Basis::Career)
		&& me.function_area.is_related(them.function_area))
	.then_some(them.function_area);
	let personality =
		if bases.contains(Basis::Personality) { personality_pair(me, them) } else { None };

	Evidence { name: safe_name(them), goal, expertise, hobby, their_title, shared_area, personality }
}

/// Expertise of `them` sharing a word with one of my goals.
fn bridged_expertise<'a>(me: &ProfileData, them: &'a ProfileData) -> Option<&'a str> {
	let goal_tokens = me.networking_goals.tokens();

	them.expertise.iter().filter_map(usable).find(|label| {
		text::tokenize(label).iter().any(|token| goal_tokens.contains(token))
	})
}

fn personality_pair(me: &ProfileData, them: &ProfileData) -> Option<(String, String)> {
	match (&me.mbti, &them.mbti) {
		(Some(mine), Some(theirs)) if mine.shared_letters(theirs) >= 2 =>
			Some((mine.to_string(), theirs.to_string())),
		_ => match (me.enneagram, them.enneagram) {
			(Some(mine), Some(theirs)) if mine.core == theirs.core =>
				Some((format!("type {mine}"), format!("type {theirs}"))),
			_ => None,
		},
	}
}

/// The label without trailing periods, if it can be dropped into a template without breaking
/// sentence or vocabulary rules. Templates always receive the trimmed text.
fn usable(label: &str) -> Option<&str> {
	let trimmed = label.trim().trim_end_matches('.').trim_end();
	let fits = !trimmed.is_empty()
		&& !trimmed.contains(['!', '?'])
		&& count_sentences(trimmed) == 1
		&& !rules::ends_with_terminal(trimmed)
		&& find_banned_term(trimmed).is_none()
		&& !is_generic_activity(trimmed);

	fits.then_some(trimmed)
}

fn safe_name(them: &ProfileData) -> String {
	let name: String =
		them.short_name().chars().filter(|ch| !matches!(ch, '.' | '!' | '?')).collect();
	let name = name.trim().to_string();

	if name.is_empty() || name == "this attendee" || find_banned_term(&name).is_some() {
		"Your match".to_string()
	} else {
		name
	}
}

fn summary(ev: &Evidence<'_>) -> String {
	let name = &ev.name;

	match (ev.goal, ev.expertise, ev.hobby) {
		(Some(goal), Some(expertise), _) => format!(
			"{name} brings hands-on experience in {expertise} that lines up with your goal of {goal}."
		),
		(_, _, Some(hobby)) => format!(
			"You and {name} both make time for {hobby}, which gives you an easy place to start."
		),
		_ => match (ev.their_title, ev.shared_area, &ev.personality) {
			(Some(title), _, _) => format!(
				"{name} works as {} and brings a perspective close to your own work.",
				with_article(title)
			),
			(None, Some(area), _) => format!(
				"{name} works in {} and shares plenty of ground with your own path.",
				area.as_str()
			),
			(None, None, Some(_)) =>
				format!("{name} has a personality profile that tends to click with yours."),
			_ => format!("{name} is someone at this event worth a real conversation."),
		},
	}
}

fn why_meet(ev: &Evidence<'_>) -> String {
	let name = &ev.name;
	let mut sentences = Vec::new();

	if let (Some(goal), Some(expertise)) = (ev.goal, ev.expertise) {
		sentences.push(format!(
			"You listed {goal} as a goal, and {name} lists {expertise} among their strengths."
		));
	}
	if let Some(title) = ev.their_title {
		sentences.push(format!(
			"{name} works as {}, so you can compare notes on how your roles overlap.",
			with_article(title)
		));
	} else if let Some(area) = ev.shared_area {
		sentences.push(format!(
			"You both work in or near {}, so your day-to-day challenges probably rhyme.",
			area.as_str()
		));
	}
	if let Some(hobby) = ev.hobby {
		sentences.push(format!("Outside of work you share an interest in {hobby}."));
	}
	if let Some((mine, theirs)) = &ev.personality {
		sentences.push(format!(
			"Your personality types ({mine} and {theirs}) suggest the conversation will flow easily."
		));
	}

	for padding in WHY_MEET_PADDING {
		if sentences.len() >= 3 {
			break;
		}

		sentences.push((*padding).to_string());
	}

	sentences.truncate(4);

	sentences.join(" ")
}

fn activities(ev: &Evidence<'_>) -> Vec<String> {
	let name = &ev.name;
	let mut out = Vec::new();

	if let Some(hobby) = ev.hobby {
		out.push(format!(
			"Trade your best {hobby} stories and pick one thing to try together this month."
		));
	}
	if let Some(goal) = ev.goal {
		out.push(format!(
			"Spend ten minutes on one current {goal} challenge and ask {name} what they would try first."
		));
	} else if let Some(expertise) = ev.expertise {
		out.push(format!(
			"Ask {name} to walk you through one project where {expertise} made the difference."
		));
	}
	if out.len() < 3
		&& let Some(area) = ev.shared_area
	{
		out.push(format!("Compare how each of you plans a typical week in {}.", area.as_str()));
	}

	for padding in ACTIVITY_PADDING {
		if out.len() >= 2 {
			break;
		}

		out.push((*padding).to_string());
	}

	out.truncate(3);

	out
}

fn dive_deeper(ev: &Evidence<'_>) -> String {
	match (ev.goal, ev.hobby) {
		(Some(goal), _) =>
			format!("What would real progress on {goal} look like for you a year from now?"),
		(None, Some(hobby)) =>
			format!("What first drew you to {hobby}, and what keeps you coming back?"),
		(None, None) =>
			"What are you working on right now that would benefit from a fresh perspective?".to_string(),
	}
}

fn with_article(title: &str) -> String {
	let lowered = title.to_lowercase();
	let starts_with_vowel =
		lowered.chars().next().map(|ch| "aeiou".contains(ch)).unwrap_or(false);

	if lowered.starts_with("a ") || lowered.starts_with("an ") || lowered.starts_with("the ") {
		title.to_string()
	} else if starts_with_vowel {
		format!("an {title}")
	} else {
		format!("a {title}")
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;
	use crate::{
		narrative::{PanelRules, validate},
		profile::{RawProfile, normalize},
	};

	fn strings(values: &[&str]) -> Option<Vec<String>> {
		Some(values.iter().map(|value| value.to_string()).collect())
	}

	#[test]
	fn uses_concrete_values() {
		let me = normalize(RawProfile {
			user_id: Uuid::from_u128(1),
			first_name: Some("Ada".to_string()),
			networking_goals: strings(&["mentorship"]),
			hobbies: strings(&["hiking"]),
			..Default::default()
		});
		let them = normalize(RawProfile {
			user_id: Uuid::from_u128(2),
			first_name: Some("Grace".to_string()),
			expertise: strings(&["mentorship programs"]),
			hobbies: strings(&["Hiking"]),
			..Default::default()
		});
		let bases = BasisSet::empty().with(Basis::Career).with(Basis::Interests);
		let panels = fallback_panels(&me, &them, bases);

		assert!(panels.summary.contains("Grace"));
		assert!(panels.summary.contains("mentorship programs"));
		assert!(panels.why_meet.contains("hiking"));
		assert!(validate(&panels, &PanelRules::default()).is_empty(), "{panels:?}");
	}

	#[test]
	fn skips_labels_that_would_break_rules() {
		let me = normalize(RawProfile {
			user_id: Uuid::from_u128(1),
			networking_goals: strings(&["leverage my network", "find a cofounder"]),
			..Default::default()
		});
		let them = normalize(RawProfile {
			user_id: Uuid::from_u128(2),
			first_name: Some("J.".to_string()),
			..Default::default()
		});
		let panels = fallback_panels(&me, &them, BasisSet::empty().with(Basis::Career));

		assert!(panels.dive_deeper.contains("find a cofounder"));
		assert!(panels.summary.starts_with("J "));
		assert!(validate(&panels, &PanelRules::default()).is_empty(), "{panels:?}");
	}

	#[test]
	fn strips_trailing_periods_before_filling_templates() {
		let me = normalize(RawProfile {
			user_id: Uuid::from_u128(1),
			networking_goals: strings(&["Find a design mentor."]),
			..Default::default()
		});
		let them = normalize(RawProfile {
			user_id: Uuid::from_u128(2),
			first_name: Some("Grace".to_string()),
			job_title: Some("Designer.".to_string()),
			expertise: strings(&["Design."]),
			..Default::default()
		});
		let panels = fallback_panels(&me, &them, BasisSet::empty().with(Basis::Career));

		assert!(panels.summary.contains("in Design that"), "{panels:?}");
		assert!(panels.summary.ends_with("Find a design mentor."), "{panels:?}");
		assert!(!panels.why_meet.contains(".."), "{panels:?}");
		assert!(validate(&panels, &PanelRules::default()).is_empty(), "{panels:?}");
	}

	#[test]
	fn picks_article_for_titles() {
		assert_eq!(with_article("Engineer"), "an Engineer");
		assert_eq!(with_article("Product Manager"), "a Product Manager");
	}
}
