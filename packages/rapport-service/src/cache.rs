//! Memoized narratives keyed by the pair and everything the prompt is built from.

use std::time::Duration;

use moka::sync::Cache;
use serde_json::Value;

use crate::{Error, Result};
use rapport_config::LlmProviderConfig;
use rapport_domain::{BasisSet, MatchPanels, ProfileData};

pub trait NarrativeCache
where
	Self: Send + Sync,
{
	fn get(&self, key: &str) -> Option<MatchPanels>;

	fn insert(&self, key: String, panels: MatchPanels);
}

/// Never stores anything.
pub struct NoopCache;
impl NarrativeCache for NoopCache {
	fn get(&self, _key: &str) -> Option<MatchPanels> {
		None
	}

	fn insert(&self, _key: String, _panels: MatchPanels) {}
}

/// In-process cache bounded by entry count and time to live.
pub struct MemoryCache {
	entries: Cache<String, MatchPanels>,
}
impl MemoryCache {
	pub fn new(max_entries: u64, ttl: Duration) -> Self {
		Self { entries: Cache::builder().max_capacity(max_entries).time_to_live(ttl).build() }
	}

	pub fn from_config(cfg: &rapport_config::NarrativeCache) -> Self {
		Self::new(cfg.max_entries, Duration::from_secs(cfg.ttl_seconds))
	}

	pub fn entry_count(&self) -> u64 {
		self.entries.run_pending_tasks();

		self.entries.entry_count()
	}
}
impl NarrativeCache for MemoryCache {
	fn get(&self, key: &str) -> Option<MatchPanels> {
		self.entries.get(key)
	}

	fn insert(&self, key: String, panels: MatchPanels) {
		self.entries.insert(key, panels);
	}
}

pub fn hash_cache_key(payload: &Value) -> Result<String> {
	let raw = serde_json::to_vec(payload).map_err(|err| Error::InvalidRequest {
		message: format!("Failed to encode cache key payload: {err}"),
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}

pub fn cache_key_prefix(key: &str) -> &str {
	let len = key.len().min(12);

	&key[..len]
}

/// Direction matters: panels are phrased for `me`.
pub fn build_narrative_cache_key(
	provider: &LlmProviderConfig,
	me: &ProfileData,
	them: &ProfileData,
	bases: BasisSet,
	min_summary_chars: usize,
) -> Result<String> {
	let payload = serde_json::json!({
		"kind": "match_panels",
		"provider_id": provider.provider_id,
		"model": provider.model,
		"min_summary_chars": min_summary_chars,
		"bases": bases.labels(),
		"me": me,
		"them": them,
	});

	hash_cache_key(&payload)
}
