use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub matching: Matching,
	#[serde(default)]
	pub narrative: Narrative,
	#[serde(default)]
	pub batch: Batch,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub narrative: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Absent or blank means no provider is configured and narratives use the fallback text.
	#[serde(default)]
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl LlmProviderConfig {
	pub fn is_configured(&self) -> bool {
		self.api_key.as_deref().map(|key| !key.trim().is_empty()).unwrap_or(false)
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Matching {
	pub top_k: u32,
	pub weights: MatchingWeights,
	pub acceptance: MatchingAcceptance,
	pub career_overlap_cap: u32,
	pub interests_cap: u32,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			top_k: 3,
			weights: MatchingWeights::default(),
			acceptance: MatchingAcceptance::default(),
			career_overlap_cap: 3,
			interests_cap: 3,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct MatchingWeights {
	pub goals: f32,
	pub career: f32,
	pub personality: f32,
	pub interests: f32,
}
impl Default for MatchingWeights {
	fn default() -> Self {
		Self { goals: 3.0, career: 2.0, personality: 1.0, interests: 1.5 }
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MatchingAcceptance {
	pub min_total_score: f32,
	pub min_basis_score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Narrative {
	pub min_summary_chars: u32,
	pub cache: NarrativeCache,
}
impl Default for Narrative {
	fn default() -> Self {
		Self { min_summary_chars: 20, cache: NarrativeCache::default() }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NarrativeCache {
	pub enabled: bool,
	pub ttl_seconds: u64,
	pub max_entries: u64,
}
impl Default for NarrativeCache {
	fn default() -> Self {
		Self { enabled: true, ttl_seconds: 86_400, max_entries: 10_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Batch {
	pub budget_ms: u64,
	pub safety_margin_ms: u64,
}
impl Default for Batch {
	fn default() -> Self {
		Self { budget_ms: 30_000, safety_margin_ms: 5_000 }
	}
}

fn default_max_tokens() -> u32 {
	800
}
