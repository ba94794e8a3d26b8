use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

const STOP_WORDS: &[&str] = &[
	"an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it", "me",
	"my", "of", "on", "or", "our", "the", "their", "to", "we", "who", "with", "you", "your",
];

/// Lower-cased whole-word tokens, without stop words and single characters.
pub fn tokenize(text: &str) -> BTreeSet<String> {
	let normalized: String = text.nfkc().collect();
	let mut out = BTreeSet::new();

	for word in normalized.unicode_words() {
		let token = word.to_lowercase();

		if token.chars().count() < 2 || STOP_WORDS.contains(&token.as_str()) {
			continue;
		}

		out.insert(token);
	}

	out
}

pub fn tokenize_all<'a, I>(texts: I) -> BTreeSet<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut out = BTreeSet::new();

	for text in texts {
		out.extend(tokenize(text));
	}

	out
}

/// NFKC, trimmed, inner whitespace collapsed. Returns `None` for blank input.
pub fn clean_label(raw: &str) -> Option<String> {
	let normalized: String = raw.nfkc().collect();
	let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

	if collapsed.is_empty() { None } else { Some(collapsed) }
}

/// Case-insensitive comparison key for a cleaned label.
pub fn label_key(label: &str) -> String {
	label.to_lowercase()
}

pub fn overlap_count(left: &BTreeSet<String>, right: &BTreeSet<String>) -> usize {
	left.intersection(right).count()
}
