use serde_json::Value;

use crate::{
	basis::BasisSet,
	narrative::rules::{BANNED_TERMS, PanelRules, Violation},
	profile::ProfileData,
};

const GENERIC_ACTIVITY_EXAMPLES: &[&str] = &[
	"grab a coffee",
	"have lunch",
	"exchange contact info",
	"connect on LinkedIn",
	"follow each other",
	"chat at the event",
	"network together",
	"attend the next event together",
	"keep in touch",
	"schedule a call",
];

fn output_schema() -> Value {
	serde_json::json!({
		"summary": "string, exactly one sentence",
		"why_meet": "string, 3 to 4 sentences",
		"shared_activities": ["string, one full sentence each, 2 to 3 entries"],
		"dive_deeper": "string, one open personal question ending in '?'"
	})
}

fn rule_lines(rules: &PanelRules) -> String {
	let banned = BANNED_TERMS.join(", ");
	let generic = GENERIC_ACTIVITY_EXAMPLES.join(", ");

	format!(
		"- summary: exactly one sentence, longer than {min} characters, ending in '.', '!' or '?'.\n\
- why_meet: 3 to 4 sentences.\n\
- shared_activities: 2 to 3 entries, each a full sentence ending in terminal punctuation and specific to these two people.\n\
- dive_deeper: exactly one open, personal question ending in '?'.\n\
- Never use these words or phrases anywhere: {banned}.\n\
- Never suggest generic activities such as: {generic}.\n\
- Output strict JSON with exactly the keys summary, why_meet, shared_activities, dive_deeper.",
		min = rules.min_summary_chars,
	)
}

fn matchable_fields(profile: &ProfileData) -> Value {
	serde_json::json!({
		"name": profile.display_name(),
		"job_title": profile.job_title,
		"company": profile.company,
		"what_they_do": profile.what_you_do,
		"location": profile.location,
		"function_area": profile.function_area.as_str(),
		"personality_type": profile.mbti.as_ref().map(|code| code.to_string()),
		"enneagram": profile.enneagram.map(|code| code.to_string()),
		"networking_goals": profile.networking_goals,
		"hobbies": profile.hobbies,
		"expertise": profile.expertise,
	})
}

/// Messages for the first generation request. `me` is the reader; `them` is the suggested
/// introduction.
pub fn build_generation_messages(
	me: &ProfileData,
	them: &ProfileData,
	bases: BasisSet,
	rules: &PanelRules,
) -> Vec<Value> {
	let system_prompt = "You write short introductions between two attendees of the same event. \
Output must be valid JSON only and must match the provided schema exactly. \
Address the reader as \"you\" and refer to the other attendee by first name. \
When the reader's networking goals line up with the other attendee's expertise, lead with that. \
Ground every listed basis in concrete evidence from the profiles: name the shared hobby, the goal, the expertise, or the role. \
Do not invent facts that are not in the profiles. Do not add explanations or extra fields.";
	let schema = serde_json::to_string_pretty(&output_schema())
		.unwrap_or_else(|_| output_schema().to_string());
	let bases_list = bases.labels().join(", ");
	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{schema}\nRules:\n{rules}\nMatch bases: {bases_list}\nReader profile:\n{me}\nOther attendee profile:\n{them}",
		rules = rule_lines(rules),
		me = matchable_fields(me),
		them = matchable_fields(them),
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Messages for the single corrective request after a draft fails validation.
pub fn build_repair_messages(draft: &str, violations: &[Violation], rules: &PanelRules) -> Vec<Value> {
	let system_prompt = "You fix JSON drafts of attendee introductions. \
Output must be valid JSON only with exactly the keys summary, why_meet, shared_activities, dive_deeper. \
Keep every concrete fact from the draft and change only what the listed problems require.";
	let problems = if violations.is_empty() {
		"- The draft could not be read as a JSON object.".to_string()
	} else {
		violations.iter().map(|violation| format!("- {violation}")).collect::<Vec<_>>().join("\n")
	};
	let user_prompt = format!(
		"Rules:\n{rules}\nProblems found:\n{problems}\nDraft:\n{draft}\nReturn the corrected JSON object.",
		rules = rule_lines(rules),
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;
	use crate::{
		basis::Basis,
		profile::{RawProfile, normalize},
	};

	#[test]
	fn generation_prompt_embeds_bases_and_profiles() {
		let me = normalize(RawProfile {
			user_id: Uuid::from_u128(1),
			first_name: Some("Ada".to_string()),
			..Default::default()
		});
		let them = normalize(RawProfile {
			user_id: Uuid::from_u128(2),
			first_name: Some("Grace".to_string()),
			hobbies: Some(vec!["sailing".to_string()]),
			..Default::default()
		});
		let messages = build_generation_messages(
			&me,
			&them,
			BasisSet::empty().with(Basis::Interests),
			&PanelRules::default(),
		);
		let user = messages[1]["content"].as_str().expect("user content");

		assert_eq!(messages.len(), 2);
		assert!(user.contains("Match bases: interests"));
		assert!(user.contains("sailing"));
		assert!(user.contains("synergy"));
	}

	#[test]
	fn repair_prompt_lists_violations() {
		let messages = build_repair_messages(
			"{}",
			&[Violation::DiveDeeperNotQuestion],
			&PanelRules::default(),
		);
		let user = messages[1]["content"].as_str().expect("user content");

		assert!(user.contains("dive_deeper must be one open, personal question"));
	}
}
