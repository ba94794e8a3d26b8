use uuid::Uuid;

use rapport_domain::{ProfileData, RawProfile, profile};

pub fn strings(values: &[&str]) -> Option<Vec<String>> {
	Some(values.iter().map(|value| value.to_string()).collect())
}

pub fn raw(id: u128, first_name: &str) -> RawProfile {
	RawProfile {
		user_id: Uuid::from_u128(id),
		first_name: Some(first_name.to_string()),
		..Default::default()
	}
}

pub fn roster() -> Vec<ProfileData> {
	vec![
		profile::normalize(RawProfile {
			job_title: Some("Product Manager".to_string()),
			company: Some("Acme".to_string()),
			mbti: Some("INTJ".to_string()),
			networking_goals: strings(&["mentorship", "fundraising"]),
			hobbies: strings(&["hiking", "cooking"]),
			expertise: strings(&["roadmaps"]),
			..raw(1, "Ada")
		}),
		profile::normalize(RawProfile {
			job_title: Some("Staff Software Engineer".to_string()),
			company: Some("Acme".to_string()),
			mbti: Some("ENTJ".to_string()),
			enneagram: Some("5w4".to_string()),
			networking_goals: strings(&["hiring"]),
			hobbies: strings(&["Cooking", "chess"]),
			expertise: strings(&["mentorship", "distributed systems"]),
			..raw(2, "Grace")
		}),
		profile::normalize(RawProfile {
			job_title: Some("Venture Investor".to_string()),
			what_you_do: Some("Seed fundraising for climate startups".to_string()),
			enneagram: Some("5".to_string()),
			networking_goals: strings(&["deal flow"]),
			hobbies: strings(&["sailing"]),
			expertise: strings(&["fundraising", "board governance"]),
			..raw(3, "Linus")
		}),
		profile::normalize(RawProfile {
			job_title: Some("Pastry Chef".to_string()),
			hobbies: strings(&["poetry"]),
			..raw(4, "Margaret")
		}),
		profile::normalize(RawProfile {
			job_title: Some("UX Designer".to_string()),
			mbti: Some("INFP".to_string()),
			hobbies: strings(&["hiking", "pottery"]),
			networking_goals: strings(&["career change"]),
			..raw(5, "Barbara")
		}),
		profile::normalize(RawProfile {
			job_title: Some("Recruiter".to_string()),
			hobbies: strings(&["chess"]),
			expertise: strings(&["hiring"]),
			..raw(6, "Edsger")
		}),
	]
}
