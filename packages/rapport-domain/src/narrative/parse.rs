//! Recovery of panel JSON from free-form provider output.

use serde::Deserialize;

use crate::narrative::{MatchPanels, rules};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActivitiesField {
	List(Vec<String>),
	Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPanels {
	summary: Option<String>,
	why_meet: Option<String>,
	shared_activities: Option<ActivitiesField>,
	dive_deeper: Option<String>,
}
impl RawPanels {
	fn has_known_field(&self) -> bool {
		self.summary.is_some()
			|| self.why_meet.is_some()
			|| self.shared_activities.is_some()
			|| self.dive_deeper.is_some()
	}
}
impl From<RawPanels> for MatchPanels {
	fn from(raw: RawPanels) -> Self {
		let shared_activities = match raw.shared_activities {
			Some(ActivitiesField::List(items)) =>
				items.into_iter().map(|item| item.trim().to_string()).collect(),
			Some(ActivitiesField::Text(text)) => rules::split_sentences(&text),
			None => Vec::new(),
		};

		Self {
			summary: raw.summary.unwrap_or_default().trim().to_string(),
			why_meet: raw.why_meet.unwrap_or_default().trim().to_string(),
			shared_activities,
			dive_deeper: raw.dive_deeper.unwrap_or_default().trim().to_string(),
		}
	}
}

/// Parses the whole text as JSON, then falls back to the first balanced `{...}` substring,
/// which covers code fences and JSON embedded in prose. An object without any panel key is not
/// a parse.
pub fn parse_panels(raw: &str) -> Option<MatchPanels> {
	if let Some(panels) = parse_object(raw.trim()) {
		return Some(panels);
	}

	parse_object(extract_json_object(raw)?)
}

fn parse_object(text: &str) -> Option<MatchPanels> {
	serde_json::from_str::<RawPanels>(text)
		.ok()
		.filter(RawPanels::has_known_field)
		.map(Into::into)
}

/// First balanced `{...}` substring, ignoring braces inside JSON strings.
pub fn extract_json_object(raw: &str) -> Option<&str> {
	let start = raw.find('{')?;
	let mut depth = 0_usize;
	let mut in_string = false;
	let mut escaped = false;

	for (offset, ch) in raw[start..].char_indices() {
		if in_string {
			match ch {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'"' => in_string = false,
				_ => {},
			}

			continue;
		}

		match ch {
			'"' => in_string = true,
			'{' => depth += 1,
			'}' => {
				depth -= 1;

				if depth == 0 {
					return Some(&raw[start..start + offset + ch.len_utf8()]);
				}
			},
			_ => {},
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_object_from_prose() {
		let raw = "Sure! Here it is: {\"summary\": \"Braces } inside strings.\"} Hope it helps.";

		assert_eq!(extract_json_object(raw), Some("{\"summary\": \"Braces } inside strings.\"}"));
	}

	#[test]
	fn unbalanced_input_yields_none() {
		assert_eq!(extract_json_object("{\"summary\": \"cut off"), None);
		assert!(parse_panels("no json here").is_none());
	}

	#[test]
	fn objects_without_panel_keys_are_not_panels() {
		assert!(parse_panels("{}").is_none());
		assert!(parse_panels(r#"{"error": "rate limited", "retry_after": 3}"#).is_none());
		assert!(parse_panels(r#"Here you go: {"note": "none"} and {"summary": "A."}"#).is_none());

		let partial = parse_panels(r#"{"summary": "Only a summary."}"#).expect("parse failed");

		assert_eq!(partial.summary, "Only a summary.");
		assert!(partial.why_meet.is_empty());
	}

	#[test]
	fn activities_text_is_split_into_sentences() {
		let panels = parse_panels(
			r#"{"summary":"A.","why_meet":"B.","shared_activities":"Cook paella. Sail on Sunday.","dive_deeper":"Why?"}"#,
		)
		.expect("parse failed");

		assert_eq!(panels.shared_activities, vec!["Cook paella.", "Sail on Sunday."]);
	}
}
