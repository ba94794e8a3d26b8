use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rapport_service::{ParticipantOutcome, RapportService};
use rapport_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = rapport_cli::VERSION,
	rename_all = "kebab",
	styles = rapport_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Event whose participants are matched.
	#[arg(long, short = 'e', value_name = "UUID")]
	pub event: Uuid,
	/// Match only this participant instead of the whole event.
	#[arg(long, short = 'p', value_name = "UUID")]
	pub participant: Option<Uuid>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = rapport_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	if !config.providers.narrative.is_configured() {
		tracing::warn!(
			provider_id = %config.providers.narrative.provider_id,
			"Narrative provider has no API key. All narratives will use fallback text."
		);
	}

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = RapportService::new(&config, db);

	match args.participant {
		Some(user_id) => {
			let outcome = service.match_participant(args.event, user_id).await?;

			if outcome == ParticipantOutcome::Skipped {
				return Err(eyre::eyre!(
					"Participant {user_id} is not part of event {}.",
					args.event
				));
			}

			println!("{}", serde_json::to_string(&outcome)?);
		},
		None => {
			let report = service.run_event_batch(args.event).await?;

			println!("{}", serde_json::to_string(&report)?);
		},
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_batch_and_single_participant_forms() {
		let event = "6f1c1f57-3f0b-4a4e-9d55-1f0e9c1f2a10";
		let batch =
			Args::try_parse_from(["rapport-worker", "--config", "rapport.toml", "--event", event])
				.expect("batch args");

		assert_eq!(batch.participant, None);
		assert_eq!(batch.config, PathBuf::from("rapport.toml"));

		let single = Args::try_parse_from([
			"rapport-worker",
			"-c",
			"rapport.toml",
			"-e",
			event,
			"-p",
			"00000000-0000-0000-0000-000000000002",
		])
		.expect("single args");

		assert_eq!(single.participant, Some(Uuid::from_u128(2)));
	}

	#[test]
	fn rejects_malformed_event_id() {
		assert!(
			Args::try_parse_from(["rapport-worker", "-c", "rapport.toml", "-e", "not-a-uuid"])
				.is_err()
		);
	}
}
