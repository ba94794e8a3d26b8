pub mod batch;
pub mod cache;
pub mod locks;
pub mod matching;
pub mod narrative;

mod error;

pub use batch::BatchReport;
pub use cache::{MemoryCache, NarrativeCache, NoopCache};
pub use error::{Error, Result};
pub use locks::ParticipantLocks;
pub use matching::ParticipantOutcome;
pub use narrative::{FallbackReason, GeneratedNarrative, NarrativeOutcome};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde_json::Value;
use uuid::Uuid;

use rapport_config::{Config, LlmProviderConfig};
use rapport_domain::{ProfileData, RankOptions, ScoredMatch, Weights, narrative::PanelRules};
use rapport_providers::generation;
use rapport_storage::{db::Db, models::NewMatch, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait TextGenerator
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;
}

/// Reads rosters and owns each participant's persisted match set.
pub trait MatchStore
where
	Self: Send + Sync,
{
	fn profile<'a>(
		&'a self,
		event_id: Uuid,
		user_id: Uuid,
	) -> BoxFuture<'a, Result<Option<ProfileData>>>;

	fn event_profiles<'a>(&'a self, event_id: Uuid) -> BoxFuture<'a, Result<Vec<ProfileData>>>;

	fn event_weights<'a>(
		&'a self,
		event_id: Uuid,
		defaults: Weights,
	) -> BoxFuture<'a, Result<Weights>>;

	fn current_matches<'a>(
		&'a self,
		event_id: Uuid,
		user_id: Uuid,
	) -> BoxFuture<'a, Result<Vec<ScoredMatch>>>;

	/// Deletes every match involving `user_id` and inserts `matches` atomically. Returns the
	/// match-set version after the write.
	fn replace_matches<'a>(
		&'a self,
		event_id: Uuid,
		user_id: Uuid,
		matches: &'a [NewMatch],
		changed: bool,
	) -> BoxFuture<'a, Result<i64>>;
}

pub struct HttpGenerator;
impl TextGenerator for HttpGenerator {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(generation::complete(cfg, messages).await?) })
	}
}

pub struct PgStore {
	pub db: Db,
}
impl MatchStore for PgStore {
	fn profile<'a>(
		&'a self,
		event_id: Uuid,
		user_id: Uuid,
	) -> BoxFuture<'a, Result<Option<ProfileData>>> {
		Box::pin(async move { Ok(queries::fetch_profile(&self.db, event_id, user_id).await?) })
	}

	fn event_profiles<'a>(&'a self, event_id: Uuid) -> BoxFuture<'a, Result<Vec<ProfileData>>> {
		Box::pin(async move { Ok(queries::fetch_event_profiles(&self.db, event_id).await?) })
	}

	fn event_weights<'a>(
		&'a self,
		event_id: Uuid,
		defaults: Weights,
	) -> BoxFuture<'a, Result<Weights>> {
		Box::pin(async move {
			Ok(queries::fetch_event_weights(&self.db, event_id, defaults).await?)
		})
	}

	fn current_matches<'a>(
		&'a self,
		event_id: Uuid,
		user_id: Uuid,
	) -> BoxFuture<'a, Result<Vec<ScoredMatch>>> {
		Box::pin(async move {
			Ok(queries::fetch_current_matches(&self.db, event_id, user_id).await?)
		})
	}

	fn replace_matches<'a>(
		&'a self,
		event_id: Uuid,
		user_id: Uuid,
		matches: &'a [NewMatch],
		changed: bool,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move {
			Ok(queries::replace_matches(&self.db, event_id, user_id, matches, changed).await?)
		})
	}
}

/// Wall-clock budget for one batch run. New participants are not started once less than
/// `safety_margin` remains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchBudget {
	pub budget: Duration,
	pub safety_margin: Duration,
}
impl From<&rapport_config::Batch> for BatchBudget {
	fn from(cfg: &rapport_config::Batch) -> Self {
		Self {
			budget: Duration::from_millis(cfg.budget_ms),
			safety_margin: Duration::from_millis(cfg.safety_margin_ms),
		}
	}
}

#[derive(Clone, Debug)]
pub struct ServiceSettings {
	pub provider: LlmProviderConfig,
	pub rank: RankOptions,
	pub rules: PanelRules,
	pub batch: BatchBudget,
}
impl ServiceSettings {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			provider: cfg.providers.narrative.clone(),
			rank: RankOptions::from_config(&cfg.matching, cfg.matching.weights.into()),
			rules: PanelRules::from(&cfg.narrative),
			batch: BatchBudget::from(&cfg.batch),
		}
	}
}

pub struct RapportService {
	pub settings: ServiceSettings,
	pub store: Arc<dyn MatchStore>,
	pub generator: Arc<dyn TextGenerator>,
	pub cache: Arc<dyn NarrativeCache>,
	pub locks: ParticipantLocks,
}
impl RapportService {
	pub fn new(cfg: &Config, db: Db) -> Self {
		let cache: Arc<dyn NarrativeCache> = if cfg.narrative.cache.enabled {
			Arc::new(MemoryCache::from_config(&cfg.narrative.cache))
		} else {
			Arc::new(NoopCache)
		};

		Self::with_parts(
			ServiceSettings::from_config(cfg),
			Arc::new(PgStore { db }),
			Arc::new(HttpGenerator),
			cache,
		)
	}

	pub fn with_parts(
		settings: ServiceSettings,
		store: Arc<dyn MatchStore>,
		generator: Arc<dyn TextGenerator>,
		cache: Arc<dyn NarrativeCache>,
	) -> Self {
		Self { settings, store, generator, cache, locks: ParticipantLocks::default() }
	}
}
