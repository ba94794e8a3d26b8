use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reason category attached to a match.
///
/// Goal fulfilment is reported as [`Basis::Career`]; the separate goals label is accepted on
/// input and folded into career so stored rows written by older runs stay readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
	Career,
	Interests,
	Personality,
}
impl Basis {
	pub const ALL: [Basis; 3] = [Self::Career, Self::Interests, Self::Personality];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Career => "career",
			Self::Interests => "interests",
			Self::Personality => "personality",
		}
	}

	fn bit(self) -> u8 {
		match self {
			Self::Career => 0b001,
			Self::Interests => 0b010,
			Self::Personality => 0b100,
		}
	}
}
impl fmt::Display for Basis {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Basis {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"career" | "goals" | "goal" => Ok(Self::Career),
			"interests" | "interest" | "hobbies" => Ok(Self::Interests),
			"personality" => Ok(Self::Personality),
			_ => Err(Error::UnknownBasis { label: raw.to_string() }),
		}
	}
}

/// Closed set of [`Basis`] values, iterated in declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BasisSet(u8);
impl BasisSet {
	pub fn empty() -> Self {
		Self(0)
	}

	pub fn insert(&mut self, basis: Basis) {
		self.0 |= basis.bit();
	}

	pub fn with(mut self, basis: Basis) -> Self {
		self.insert(basis);

		self
	}

	pub fn contains(self, basis: Basis) -> bool {
		self.0 & basis.bit() != 0
	}

	pub fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub fn len(self) -> usize {
		self.0.count_ones() as usize
	}

	pub fn union(self, other: Self) -> Self {
		Self(self.0 | other.0)
	}

	pub fn iter(self) -> impl Iterator<Item = Basis> {
		Basis::ALL.into_iter().filter(move |basis| self.contains(*basis))
	}

	pub fn labels(self) -> Vec<String> {
		self.iter().map(|basis| basis.as_str().to_string()).collect()
	}

	/// Parses stored labels; unknown labels are an error rather than passed through.
	pub fn from_labels<I, S>(labels: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut set = Self::empty();

		for label in labels {
			set.insert(label.as_ref().parse()?);
		}

		Ok(set)
	}
}
impl FromIterator<Basis> for BasisSet {
	fn from_iter<T: IntoIterator<Item = Basis>>(iter: T) -> Self {
		let mut set = Self::empty();

		for basis in iter {
			set.insert(basis);
		}

		set
	}
}
impl Serialize for BasisSet {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.collect_seq(self.iter())
	}
}
impl<'de> Deserialize<'de> for BasisSet {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let labels = Vec::<String>::deserialize(deserializer)?;

		Self::from_labels(labels).map_err(serde::de::Error::custom)
	}
}
