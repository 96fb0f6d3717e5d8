use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the scoring path needs to know about a job: its description text and
/// the two weighted keyword categories. Read-only from this service's
/// perspective; rows are owned by the job-management collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirements {
    pub job_id: Uuid,
    pub jd_text: String,
    pub high_priority_keywords: BTreeSet<String>,
    pub normal_keywords: BTreeSet<String>,
}

/// Splits a comma-separated skill column into a keyword set, dropping blanks.
pub fn split_keywords(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
