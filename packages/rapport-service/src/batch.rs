use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::{ParticipantOutcome, RapportService, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
	pub event_id: Uuid,
	pub processed: usize,
	pub unchanged: usize,
	pub skipped: usize,
	pub failed: usize,
	/// Participants not started because the budget ran low. The next run picks them up.
	pub deferred: Vec<Uuid>,
	pub elapsed_ms: u64,
}
impl BatchReport {
	pub fn is_complete(&self) -> bool {
		self.deferred.is_empty()
	}
}

impl RapportService {
	/// Matches every participant of the event in id order until the time budget runs low.
	/// A failed participant is logged and counted; the loop continues with the next one.
	pub async fn run_event_batch(&self, event_id: Uuid) -> Result<BatchReport> {
		let started = Instant::now();
		let budget = self.settings.batch;
		let roster = self.store.event_profiles(event_id).await?;
		let mut report = BatchReport { event_id, ..Default::default() };

		tracing::info!(%event_id, participants = roster.len(), "Starting event batch.");

		for (idx, me) in roster.iter().enumerate() {
			let remaining = budget.budget.saturating_sub(started.elapsed());

			if remaining <= budget.safety_margin {
				report.deferred = roster[idx..].iter().map(|profile| profile.id).collect();

				tracing::warn!(
					%event_id,
					deferred = report.deferred.len(),
					remaining_ms = remaining.as_millis() as u64,
					"Batch budget exhausted. Leaving participants for the next run."
				);

				break;
			}

			let _guard = self.locks.acquire(event_id, me.id).await;

			match self.match_with_roster(event_id, me, &roster).await {
				Ok(ParticipantOutcome::Updated { .. }) => report.processed += 1,
				Ok(ParticipantOutcome::Unchanged { .. }) => report.unchanged += 1,
				Ok(ParticipantOutcome::Skipped) => report.skipped += 1,
				Err(err) => {
					report.failed += 1;

					tracing::error!(%event_id, user_id = %me.id, error = %err, "Participant run failed.");
				},
			}
		}

		report.elapsed_ms = started.elapsed().as_millis() as u64;

		tracing::info!(
			%event_id,
			processed = report.processed,
			unchanged = report.unchanged,
			skipped = report.skipped,
			failed = report.failed,
			deferred = report.deferred.len(),
			elapsed_ms = report.elapsed_ms,
			"Event batch finished."
		);

		Ok(report)
	}
}
