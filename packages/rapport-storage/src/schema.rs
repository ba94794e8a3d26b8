pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_events.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_events.sql")),
				"tables/002_event_participants.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_event_participants.sql")),
				"tables/003_matches.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_matches.sql")),
				"tables/004_participant_match_state.sql" => out
					.push_str(include_str!("../../../sql/tables/004_participant_match_state.sql")),
				_ => {
					out.push_str(line);
				},
			}

			out.push('\n');

			continue;
		}

		out.push_str(line);
		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expands_every_table() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));

		for table in ["events", "event_participants", "matches", "participant_match_state"] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
				"missing table {table}"
			);
		}
	}

	#[test]
	fn matches_keep_pairs_ordered() {
		assert!(render_schema().contains("CHECK (user_a < user_b)"));
	}
}
