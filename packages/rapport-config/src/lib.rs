mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Batch, Config, LlmProviderConfig, Matching, MatchingAcceptance, MatchingWeights, Narrative,
	NarrativeCache, Postgres, Providers, Service, Storage,
};

use std::{fs, path::Path};

/// Upper bound for `narrative.min_summary_chars`. Every fallback summary is longer than this.
pub const MAX_MIN_SUMMARY_CHARS: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	validate_provider(&cfg.providers.narrative)?;

	if cfg.matching.top_k == 0 {
		return Err(Error::Validation {
			message: "matching.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.career_overlap_cap == 0 {
		return Err(Error::Validation {
			message: "matching.career_overlap_cap must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.interests_cap == 0 {
		return Err(Error::Validation {
			message: "matching.interests_cap must be greater than zero.".to_string(),
		});
	}

	let weights = &cfg.matching.weights;

	for (label, value) in [
		("matching.weights.goals", weights.goals),
		("matching.weights.career", weights.career),
		("matching.weights.personality", weights.personality),
		("matching.weights.interests", weights.interests),
		("matching.acceptance.min_total_score", cfg.matching.acceptance.min_total_score),
		("matching.acceptance.min_basis_score", cfg.matching.acceptance.min_basis_score),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if value < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if cfg.narrative.min_summary_chars > MAX_MIN_SUMMARY_CHARS {
		return Err(Error::Validation {
			message: format!(
				"narrative.min_summary_chars must be at most {MAX_MIN_SUMMARY_CHARS}."
			),
		});
	}
	if cfg.narrative.cache.enabled {
		if cfg.narrative.cache.max_entries == 0 {
			return Err(Error::Validation {
				message: "narrative.cache.max_entries must be greater than zero when enabled."
					.to_string(),
			});
		}
		if cfg.narrative.cache.ttl_seconds == 0 {
			return Err(Error::Validation {
				message: "narrative.cache.ttl_seconds must be greater than zero when enabled."
					.to_string(),
			});
		}
	}
	if cfg.batch.budget_ms == 0 {
		return Err(Error::Validation {
			message: "batch.budget_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.batch.safety_margin_ms >= cfg.batch.budget_ms {
		return Err(Error::Validation {
			message: "batch.safety_margin_ms must be less than batch.budget_ms.".to_string(),
		});
	}

	Ok(())
}

fn validate_provider(provider: &LlmProviderConfig) -> Result<()> {
	for (label, value) in [
		("providers.narrative.provider_id", &provider.provider_id),
		("providers.narrative.model", &provider.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if provider.is_configured() && provider.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.narrative.api_base must be non-empty when api_key is set."
				.to_string(),
		});
	}
	if !provider.temperature.is_finite() || !(0.0..=2.0).contains(&provider.temperature) {
		return Err(Error::Validation {
			message: "providers.narrative.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if provider.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.narrative.max_tokens must be greater than zero.".to_string(),
		});
	}
	if provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.narrative.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if provider.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "providers.narrative.default_headers values must be strings.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let narrative = &mut cfg.providers.narrative;

	if narrative.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		narrative.api_key = None;
	}

	narrative.api_base = narrative.api_base.trim_end_matches('/').to_string();
}
