use sqlx::{Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{EventWeightsRow, MatchRow, NewMatch, ParticipantRow},
};
use rapport_domain::{ProfileData, ScoredMatch, Weights, profile, ranking};

const PARTICIPANT_COLUMNS: &str = "\
	event_id,
	user_id,
	first_name,
	last_name,
	job_title,
	company,
	what_you_do,
	location,
	mbti,
	enneagram,
	networking_goals,
	hobbies,
	expertise,
	updated_at";

pub async fn fetch_profile(db: &Db, event_id: Uuid, user_id: Uuid) -> Result<Option<ProfileData>> {
	let sql = format!(
		"\
SELECT
{PARTICIPANT_COLUMNS}
FROM event_participants
WHERE event_id = $1 AND user_id = $2"
	);
	let row: Option<ParticipantRow> = sqlx::query_as(&sql)
		.bind(event_id)
		.bind(user_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(row.map(|row| profile::normalize(row.into())))
}

/// Every participant of the event, ordered by user id.
pub async fn fetch_event_profiles(db: &Db, event_id: Uuid) -> Result<Vec<ProfileData>> {
	let sql = format!(
		"\
SELECT
{PARTICIPANT_COLUMNS}
FROM event_participants
WHERE event_id = $1
ORDER BY user_id ASC"
	);
	let rows: Vec<ParticipantRow> = sqlx::query_as(&sql).bind(event_id).fetch_all(&db.pool).await?;

	Ok(rows.into_iter().map(|row| profile::normalize(row.into())).collect())
}

/// The event's weights with null columns filled from `defaults`. A missing event is an error.
pub async fn fetch_event_weights(db: &Db, event_id: Uuid, defaults: Weights) -> Result<Weights> {
	let row: Option<EventWeightsRow> = sqlx::query_as(
		"\
SELECT
	weight_goals,
	weight_career,
	weight_personality,
	weight_interests
FROM events
WHERE event_id = $1",
	)
	.bind(event_id)
	.fetch_optional(&db.pool)
	.await?;
	let Some(row) = row else {
		return Err(Error::NotFound(format!("event {event_id}")));
	};

	Ok(row.resolve(defaults))
}

async fn fetch_match_rows(db: &Db, event_id: Uuid, user_id: Uuid) -> Result<Vec<MatchRow>> {
	let rows = sqlx::query_as::<_, MatchRow>(
		"\
SELECT
	event_id,
	user_a,
	user_b,
	score,
	bases,
	summary,
	why_meet,
	shared_activities,
	dive_deeper,
	updated_at
FROM matches
WHERE event_id = $1 AND (user_a = $2 OR user_b = $2)",
	)
	.bind(event_id)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// The participant's stored match set, score descending with id ascending on ties.
pub async fn fetch_current_matches(
	db: &Db,
	event_id: Uuid,
	user_id: Uuid,
) -> Result<Vec<ScoredMatch>> {
	let rows = fetch_match_rows(db, event_id, user_id).await?;
	let mut out: Vec<ScoredMatch> = rows.iter().map(|row| row.to_scored(user_id)).collect();

	ranking::sort_matches(&mut out);

	Ok(out)
}

/// Stored rows with their narrative panels, in display order.
pub async fn fetch_match_records(
	db: &Db,
	event_id: Uuid,
	user_id: Uuid,
) -> Result<Vec<MatchRow>> {
	let mut rows = fetch_match_rows(db, event_id, user_id).await?;

	rows.sort_by(|a, b| {
		b.score
			.total_cmp(&a.score)
			.then_with(|| a.counterpart(user_id).cmp(&b.counterpart(user_id)))
	});

	Ok(rows)
}

pub async fn fetch_match_version(db: &Db, event_id: Uuid, user_id: Uuid) -> Result<i64> {
	let version: Option<i64> = sqlx::query_scalar(
		"\
SELECT version
FROM participant_match_state
WHERE event_id = $1 AND user_id = $2",
	)
	.bind(event_id)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(version.unwrap_or(0))
}

/// Replaces every match involving `user_id` in one transaction and returns the match-set
/// version after the write. The version only moves when `changed` is true.
pub async fn replace_matches(
	db: &Db,
	event_id: Uuid,
	user_id: Uuid,
	matches: &[NewMatch],
	changed: bool,
) -> Result<i64> {
	if let Some(entry) = matches.iter().find(|entry| entry.candidate_id == user_id) {
		return Err(Error::InvalidArgument(format!(
			"participant {} cannot be matched with itself",
			entry.candidate_id
		)));
	}

	let now = OffsetDateTime::now_utc();
	let mut tx = db.pool.begin().await?;

	lock_participant(&mut tx, event_id, user_id).await?;

	sqlx::query(
		"\
DELETE FROM matches
WHERE event_id = $1 AND (user_a = $2 OR user_b = $2)",
	)
	.bind(event_id)
	.bind(user_id)
	.execute(&mut *tx)
	.await?;

	for entry in matches {
		let (user_a, user_b) = entry.ordered_pair(user_id);

		sqlx::query(
			"\
INSERT INTO matches (
	event_id,
	user_a,
	user_b,
	score,
	bases,
	summary,
	why_meet,
	shared_activities,
	dive_deeper,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
		)
		.bind(event_id)
		.bind(user_a)
		.bind(user_b)
		.bind(entry.score)
		.bind(entry.bases.labels())
		.bind(entry.panels.summary.as_str())
		.bind(entry.panels.why_meet.as_str())
		.bind(&entry.panels.shared_activities)
		.bind(entry.panels.dive_deeper.as_str())
		.bind(now)
		.execute(&mut *tx)
		.await?;
	}

	let version: i64 = sqlx::query_scalar(
		"\
INSERT INTO participant_match_state (event_id, user_id, version, updated_at)
VALUES ($1, $2, CASE WHEN $3 THEN 1 ELSE 0 END, $4)
ON CONFLICT (event_id, user_id) DO UPDATE
SET
	version = participant_match_state.version + CASE WHEN $3 THEN 1 ELSE 0 END,
	updated_at = EXCLUDED.updated_at
RETURNING version",
	)
	.bind(event_id)
	.bind(user_id)
	.bind(changed)
	.bind(now)
	.fetch_one(&mut *tx)
	.await?;

	tx.commit().await?;

	tracing::debug!(
		%event_id,
		%user_id,
		matches = matches.len(),
		version,
		"Replaced participant match set."
	);

	Ok(version)
}

/// Serializes writers for one participant across processes until the transaction ends.
async fn lock_participant(
	tx: &mut Transaction<'_, Postgres>,
	event_id: Uuid,
	user_id: Uuid,
) -> Result<()> {
	sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
		.bind(format!("rapport:{event_id}:{user_id}"))
		.execute(&mut **tx)
		.await?;

	Ok(())
}
