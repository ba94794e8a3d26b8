//! Projection of stored participant records into the shape the scorer works on.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text;

/// A participant record as read from storage, before normalization.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawProfile {
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
}

/// Matchable attributes of one participant.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProfileData {
	pub id: Uuid,
	pub first_name: String,
	pub last_name: String,
	pub job_title: Option<String>,
	pub company: Option<String>,
	pub what_you_do: Option<String>,
	pub location: Option<String>,
	pub mbti: Option<TypeCode>,
	pub enneagram: Option<EnneagramCode>,
	pub networking_goals: LabelSet,
	pub hobbies: LabelSet,
	pub expertise: LabelSet,
	pub function_area: FunctionArea,
}
impl ProfileData {
	pub fn display_name(&self) -> String {
		match (self.first_name.is_empty(), self.last_name.is_empty()) {
			(false, false) => format!("{} {}", self.first_name, self.last_name),
			(false, true) => self.first_name.clone(),
			(true, false) => self.last_name.clone(),
			(true, true) => "this attendee".to_string(),
		}
	}

	pub fn short_name(&self) -> String {
		if self.first_name.is_empty() { self.display_name() } else { self.first_name.clone() }
	}

	/// Title, company, and description tokens used for career overlap.
	pub fn career_tokens(&self) -> BTreeSet<String> {
		text::tokenize_all(
			[&self.job_title, &self.company, &self.what_you_do]
				.into_iter()
				.filter_map(|field| field.as_deref()),
		)
	}
}

/// Labels deduplicated case-insensitively, keeping the first spelling and listing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LabelSet {
	labels: Vec<String>,
}
impl LabelSet {
	/// Entries may themselves be comma or semicolon separated lists.
	pub fn from_raw<I, S>(raw: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut labels = Vec::new();
		let mut seen = BTreeSet::new();

		for entry in raw {
			for part in entry.as_ref().split([',', ';']) {
				let Some(label) = text::clean_label(part) else { continue };

				if seen.insert(text::label_key(&label)) {
					labels.push(label);
				}
			}
		}

		Self { labels }
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.labels.iter().map(String::as_str)
	}

	pub fn first(&self) -> Option<&str> {
		self.labels.first().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}

	pub fn contains(&self, label: &str) -> bool {
		let key = text::label_key(label.trim());

		self.labels.iter().any(|existing| text::label_key(existing) == key)
	}

	/// Labels of `self` also present in `other`, in `self`'s order.
	pub fn intersection<'a>(&'a self, other: &LabelSet) -> Vec<&'a str> {
		let keys = other.keys();

		self.iter().filter(|label| keys.contains(&text::label_key(label))).collect()
	}

	pub fn keys(&self) -> BTreeSet<String> {
		self.labels.iter().map(|label| text::label_key(label)).collect()
	}

	pub fn tokens(&self) -> BTreeSet<String> {
		text::tokenize_all(self.iter())
	}
}

/// A four-letter personality type code such as `INTJ`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TypeCode(String);
impl TypeCode {
	pub fn parse(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();

		if trimmed.len() != 4 || !trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
			return None;
		}

		Some(Self(trimmed.to_ascii_uppercase()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Distinct letters present in both codes, regardless of position.
	pub fn shared_letters(&self, other: &TypeCode) -> usize {
		let mine: BTreeSet<char> = self.0.chars().collect();
		let theirs: BTreeSet<char> = other.0.chars().collect();

		mine.intersection(&theirs).count()
	}
}
impl fmt::Display for TypeCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A single-digit personality code with an optional wing, e.g. `4w5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnneagramCode {
	pub core: u8,
	pub wing: Option<u8>,
}
impl EnneagramCode {
	/// Accepts `4`, `4w5`, `Type 4`, and similar spellings. Multi-digit numbers are rejected.
	pub fn parse(raw: &str) -> Option<Self> {
		let lowered = raw.trim().to_ascii_lowercase();
		let mut chars = lowered.chars().skip_while(|ch| !ch.is_ascii_digit());
		let core = chars.next()?.to_digit(10)? as u8;

		if !(1..=9).contains(&core) {
			return None;
		}

		let rest: String = chars.collect();

		if rest.starts_with(|ch: char| ch.is_ascii_digit()) {
			return None;
		}

		let wing = rest
			.strip_prefix('w')
			.and_then(|tail| tail.chars().next())
			.and_then(|ch| ch.to_digit(10))
			.map(|digit| digit as u8)
			.filter(|digit| (1..=9).contains(digit));

		Some(Self { core, wing })
	}
}
impl fmt::Display for EnneagramCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.wing {
			Some(wing) => write!(f, "{}w{}", self.core, wing),
			None => write!(f, "{}", self.core),
		}
	}
}

/// Coarse professional domain inferred from title and description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionArea {
	Marketing,
	Sales,
	Product,
	Engineering,
	Design,
	Finance,
	Operations,
	Data,
	People,
	Other,
}
impl FunctionArea {
	const KEYWORDS: &'static [(FunctionArea, &'static [&'static str])] = &[
		(Self::Marketing, &["marketing", "marketer", "brand", "growth", "seo", "content", "campaign", "communications", "pr"]),
		(Self::Sales, &["sales", "account", "revenue", "partnerships", "bd", "business", "customer", "success"]),
		(Self::Product, &["product", "pm", "roadmap", "owner"]),
		(Self::Engineering, &["engineer", "engineering", "developer", "software", "backend", "frontend", "devops", "cto", "architect", "programmer"]),
		(Self::Design, &["design", "designer", "ux", "ui", "creative", "illustrator", "researcher"]),
		(Self::Finance, &["finance", "financial", "accounting", "accountant", "cfo", "investor", "investment", "vc", "controller"]),
		(Self::Operations, &["operations", "ops", "coo", "logistics", "supply", "procurement", "program"]),
		(Self::Data, &["data", "analytics", "analyst", "scientist", "ml", "ai", "statistics"]),
		(Self::People, &["hr", "people", "recruiting", "recruiter", "talent", "culture"]),
	];
	const RELATED: &'static [(FunctionArea, FunctionArea)] = &[
		(Self::Marketing, Self::Sales),
		(Self::Product, Self::Engineering),
		(Self::Design, Self::Product),
		(Self::Data, Self::Product),
		(Self::Data, Self::Engineering),
		(Self::Finance, Self::Operations),
		(Self::People, Self::Operations),
	];

	/// Picks the category with the most keyword hits; ties go to the earlier table entry.
	pub fn infer(job_title: Option<&str>, what_you_do: Option<&str>) -> Self {
		let tokens = text::tokenize_all([job_title, what_you_do].into_iter().flatten());
		let mut best = (Self::Other, 0_usize);

		for (area, keywords) in Self::KEYWORDS {
			let hits = keywords.iter().filter(|keyword| tokens.contains(**keyword)).count();

			if hits > best.1 {
				best = (*area, hits);
			}
		}

		best.0
	}

	/// Same concrete area, or a pair listed in the adjacency table.
	pub fn is_related(self, other: Self) -> bool {
		if self == Self::Other || other == Self::Other {
			return false;
		}
		if self == other {
			return true;
		}

		Self::RELATED.iter().any(|(a, b)| (*a == self && *b == other) || (*a == other && *b == self))
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Marketing => "marketing",
			Self::Sales => "sales",
			Self::Product => "product",
			Self::Engineering => "engineering",
			Self::Design => "design",
			Self::Finance => "finance",
			Self::Operations => "operations",
			Self::Data => "data",
			Self::People => "people",
			Self::Other => "other",
		}
	}
}

pub fn normalize(raw: RawProfile) -> ProfileData {
	let clean = |value: Option<String>| value.as_deref().and_then(text::clean_label);
	let job_title = clean(raw.job_title);
	let what_you_do = clean(raw.what_you_do);
	let function_area = FunctionArea::infer(job_title.as_deref(), what_you_do.as_deref());

	ProfileData {
		id: raw.user_id,
		first_name: clean(raw.first_name).unwrap_or_default(),
		last_name: clean(raw.last_name).unwrap_or_default(),
		job_title,
		company: clean(raw.company),
		what_you_do,
		location: clean(raw.location),
		mbti: raw.mbti.as_deref().and_then(TypeCode::parse),
		enneagram: raw.enneagram.as_deref().and_then(EnneagramCode::parse),
		networking_goals: LabelSet::from_raw(raw.networking_goals.unwrap_or_default()),
		hobbies: LabelSet::from_raw(raw.hobbies.unwrap_or_default()),
		expertise: LabelSet::from_raw(raw.expertise.unwrap_or_default()),
		function_area,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn label_set_dedupes_case_insensitively_and_keeps_first_spelling() {
		let set = LabelSet::from_raw(["Hiking", "hiking", "Cooking; board games", " COOKING "]);

		assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Hiking", "Cooking", "board games"]);
		assert!(set.contains("BOARD GAMES"));
	}

	#[test]
	fn parses_enneagram_spellings() {
		assert_eq!(EnneagramCode::parse("4w5"), Some(EnneagramCode { core: 4, wing: Some(5) }));
		assert_eq!(EnneagramCode::parse("Type 7"), Some(EnneagramCode { core: 7, wing: None }));
		assert_eq!(EnneagramCode::parse("0"), None);
		assert_eq!(EnneagramCode::parse("none"), None);
		assert_eq!(EnneagramCode::parse("12"), None);
		assert_eq!(EnneagramCode::parse("Type 10"), None);
		assert_eq!(EnneagramCode::parse("9w1"), Some(EnneagramCode { core: 9, wing: Some(1) }));
	}

	#[test]
	fn rejects_malformed_type_codes() {
		assert_eq!(TypeCode::parse("intj").map(|code| code.to_string()), Some("INTJ".to_string()));
		assert!(TypeCode::parse("INT").is_none());
		assert!(TypeCode::parse("IN-J").is_none());
	}

	#[test]
	fn infers_function_area_from_title() {
		assert_eq!(FunctionArea::infer(Some("Senior Software Engineer"), None), FunctionArea::Engineering);
		assert_eq!(FunctionArea::infer(Some("Head of Growth Marketing"), None), FunctionArea::Marketing);
		assert_eq!(FunctionArea::infer(Some("Chef"), Some("I run a bakery")), FunctionArea::Other);
	}

	#[test]
	fn related_areas_are_symmetric() {
		assert!(FunctionArea::Marketing.is_related(FunctionArea::Sales));
		assert!(FunctionArea::Sales.is_related(FunctionArea::Marketing));
		assert!(!FunctionArea::Other.is_related(FunctionArea::Other));
		assert!(!FunctionArea::Design.is_related(FunctionArea::Finance));
	}

	#[test]
	fn normalize_materializes_missing_sets() {
		let profile = normalize(RawProfile { user_id: Uuid::nil(), ..Default::default() });

		assert!(profile.hobbies.is_empty());
		assert!(profile.networking_goals.is_empty());
		assert!(profile.expertise.is_empty());
		assert_eq!(profile.function_area, FunctionArea::Other);
		assert_eq!(profile.display_name(), "this attendee");
	}
}
