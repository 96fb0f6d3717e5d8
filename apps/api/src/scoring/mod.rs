//! Match Scoring Engine — pure, deterministic keyword scorer measuring a
//! resume against a job's weighted keyword categories.
//!
//! No I/O, no clock, no randomness: identical inputs always produce an
//! identical `MatchOutcome`. The engine owns no business thresholds — weights
//! and cutoffs arrive via `MatchConfig`.

pub mod worker;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::job::JobRequirements;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Scoring weights and classification thresholds. Defaults follow the hiring
/// policy: high-priority skills dominate (0.7/0.3), shortlist at ≥ 0.7,
/// review at ≥ 0.4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    pub weight_high: f64,
    pub weight_normal: f64,
    pub shortlist_threshold: f64,
    pub review_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weight_high: 0.7,
            weight_normal: 0.3,
            shortlist_threshold: 0.7,
            review_threshold: 0.4,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Classification of a scored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLabel {
    Shortlisted,
    Review,
    Rejected,
}

impl MatchLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLabel::Shortlisted => "shortlisted",
            MatchLabel::Review => "review",
            MatchLabel::Rejected => "rejected",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "shortlisted" => Some(MatchLabel::Shortlisted),
            "review" => Some(MatchLabel::Review),
            "rejected" => Some(MatchLabel::Rejected),
            _ => None,
        }
    }
}

/// Result of scoring one resume against one job's requirements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub score: f64,
    pub high_priority_ratio: f64,
    pub normal_ratio: f64,
    pub label: MatchLabel,
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Scores a resume against a job's keyword sets.
///
/// 1. Resume text and keywords are lowercased, stripped of punctuation, and
///    tokenized on word boundaries.
/// 2. A keyword counts as matched only as a whole token (a multi-word keyword
///    must appear as a contiguous token run) — `java` never matches inside
///    `javascript`.
/// 3. Each category ratio is `matches / |set|`; an empty keyword set is an
///    absent requirement and yields 1.0 rather than a division error.
/// 4. `score = weight_high * hp_ratio + weight_normal * normal_ratio`,
///    classified against the configured thresholds.
pub fn score_resume(
    resume_text: &str,
    requirements: &JobRequirements,
    config: &MatchConfig,
) -> MatchOutcome {
    let tokens = tokenize(resume_text);
    let token_set: HashSet<&str> = tokens.iter().map(String::as_str).collect();

    let hp_ratio = category_ratio(
        &tokens,
        &token_set,
        requirements.high_priority_keywords.iter(),
        requirements.high_priority_keywords.len(),
    );
    let normal_ratio = category_ratio(
        &tokens,
        &token_set,
        requirements.normal_keywords.iter(),
        requirements.normal_keywords.len(),
    );

    let score = config.weight_high * hp_ratio + config.weight_normal * normal_ratio;

    let label = if score >= config.shortlist_threshold {
        MatchLabel::Shortlisted
    } else if score >= config.review_threshold {
        MatchLabel::Review
    } else {
        MatchLabel::Rejected
    };

    MatchOutcome {
        score,
        high_priority_ratio: hp_ratio,
        normal_ratio,
        label,
    }
}

/// Lowercases, strips punctuation, and splits into word tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn category_ratio<'a>(
    tokens: &[String],
    token_set: &HashSet<&str>,
    keywords: impl Iterator<Item = &'a String>,
    set_len: usize,
) -> f64 {
    if set_len == 0 {
        return 1.0;
    }
    let matches = keywords
        .filter(|kw| keyword_matches(tokens, token_set, kw))
        .count();
    matches as f64 / set_len as f64
}

/// Whole-token match: single-token keywords hit the token set; multi-token
/// keywords must appear as a contiguous run in the resume token stream.
fn keyword_matches(tokens: &[String], token_set: &HashSet<&str>, keyword: &str) -> bool {
    let kw_tokens = tokenize(keyword);
    match kw_tokens.as_slice() {
        [] => false,
        [single] => token_set.contains(single.as_str()),
        many => tokens.windows(many.len()).any(|window| window == many),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
