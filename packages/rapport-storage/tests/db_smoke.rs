use uuid::Uuid;

use rapport_config::Postgres;
use rapport_domain::{Basis, BasisSet, MatchPanels, Weights};
use rapport_storage::{Error, db::Db, models::NewMatch, queries};
use rapport_testkit::TestDatabase;

async fn seed_event(db: &Db, event_id: Uuid, career_weight: Option<f32>) {
	sqlx::query("INSERT INTO events (event_id, name, weight_career) VALUES ($1, $2, $3)")
		.bind(event_id)
		.bind("Launch week")
		.bind(career_weight)
		.execute(&db.pool)
		.await
		.expect("Failed to insert event.");
}

async fn seed_participant(db: &Db, event_id: Uuid, user_id: Uuid, hobbies: &[&str]) {
	let hobbies: Vec<String> = hobbies.iter().map(|h| h.to_string()).collect();

	sqlx::query(
		"\
INSERT INTO event_participants (event_id, user_id, first_name, job_title, hobbies)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(event_id)
	.bind(user_id)
	.bind("Ada")
	.bind("Software Engineer")
	.bind(hobbies)
	.execute(&db.pool)
	.await
	.expect("Failed to insert participant.");
}

fn new_match(candidate: Uuid, score: f32) -> NewMatch {
	NewMatch {
		candidate_id: candidate,
		score,
		bases: BasisSet::empty().with(Basis::Interests),
		panels: MatchPanels {
			summary: "You both spend weekends on the trail.".to_string(),
			why_meet: "One. Two. Three.".to_string(),
			shared_activities: vec!["Plan a hike.".to_string(), "Trade trail maps.".to_string()],
			dive_deeper: "Which trail changed your mind about hiking?".to_string(),
		},
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RAPPORT_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = rapport_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set RAPPORT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_schema().await.expect("Schema bootstrap should be repeatable.");

	for table in ["events", "event_participants", "matches", "participant_match_state"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RAPPORT_PG_DSN to run."]
async fn profiles_and_weights_round_trip() {
	let Some(base_dsn) = rapport_testkit::env_dsn() else {
		eprintln!("Skipping profiles_and_weights_round_trip; set RAPPORT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let event_id = Uuid::new_v4();
	let (me, other) = (Uuid::from_u128(1), Uuid::from_u128(2));

	seed_event(&db, event_id, Some(0.5)).await;
	seed_participant(&db, event_id, me, &["Hiking, cooking"]).await;
	seed_participant(&db, event_id, other, &["hiking"]).await;

	let profile = queries::fetch_profile(&db, event_id, me)
		.await
		.expect("Failed to fetch profile.")
		.expect("Profile should exist.");

	assert_eq!(profile.hobbies.len(), 2);
	assert!(profile.networking_goals.is_empty());

	let roster = queries::fetch_event_profiles(&db, event_id).await.expect("Failed to fetch roster.");

	assert_eq!(roster.iter().map(|p| p.id).collect::<Vec<_>>(), vec![me, other]);

	let weights = queries::fetch_event_weights(&db, event_id, Weights::default())
		.await
		.expect("Failed to fetch weights.");

	assert_eq!(weights.career, 0.5);
	assert_eq!(weights.goals, Weights::default().goals);

	let missing = queries::fetch_event_weights(&db, Uuid::new_v4(), Weights::default()).await;

	assert!(matches!(missing, Err(Error::NotFound(_))));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RAPPORT_PG_DSN to run."]
async fn replace_matches_is_atomic_and_versioned() {
	let Some(base_dsn) = rapport_testkit::env_dsn() else {
		eprintln!(
			"Skipping replace_matches_is_atomic_and_versioned; set RAPPORT_PG_DSN to run this test."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let event_id = Uuid::new_v4();
	let me = Uuid::from_u128(5);
	let (low, high) = (Uuid::from_u128(2), Uuid::from_u128(9));

	seed_event(&db, event_id, None).await;

	let version = queries::replace_matches(
		&db,
		event_id,
		me,
		&[new_match(high, 3.0), new_match(low, 4.0)],
		true,
	)
	.await
	.expect("Failed to write matches.");

	assert_eq!(version, 1);

	let stored =
		queries::fetch_current_matches(&db, event_id, me).await.expect("Failed to read matches.");

	assert_eq!(stored.iter().map(|m| m.candidate_id).collect::<Vec<_>>(), vec![low, high]);

	let ordered: Vec<(Uuid, Uuid)> =
		sqlx::query_as("SELECT user_a, user_b FROM matches WHERE event_id = $1 ORDER BY user_a")
			.bind(event_id)
			.fetch_all(&db.pool)
			.await
			.expect("Failed to read raw pairs.");

	assert_eq!(ordered, vec![(low, me), (me, high)]);

	// A self-pair aborts before anything is written.
	let rejected =
		queries::replace_matches(&db, event_id, me, &[new_match(me, 1.0)], true).await;

	assert!(matches!(rejected, Err(Error::InvalidArgument(_))));
	assert_eq!(
		queries::fetch_current_matches(&db, event_id, me).await.expect("Failed to read.").len(),
		2
	);

	let version = queries::replace_matches(&db, event_id, me, &[new_match(high, 3.0)], false)
		.await
		.expect("Failed to rewrite matches.");

	assert_eq!(version, 1);
	assert_eq!(queries::fetch_match_version(&db, event_id, me).await.expect("version"), 1);

	let records =
		queries::fetch_match_records(&db, event_id, me).await.expect("Failed to read records.");

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].panels().shared_activities.len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
