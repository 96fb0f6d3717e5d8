use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::scoring::MatchLabel;

/// An application row linking one applicant to one job, with workflow
/// metadata carried from the intake request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub source: String,
    pub assigned_hr: Option<String>,
    pub assigned_manager: Option<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workflow metadata for a new application. The applicant id is assigned by
/// the orchestrator once the applicant row exists.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub applicant_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub source: String,
    pub assigned_hr: Option<String>,
    pub assigned_manager: Option<String>,
    pub comments: Option<String>,
}

/// Evaluation status values persisted in `match_evaluations.status`.
pub const EVALUATION_SCORED: &str = "scored";
pub const EVALUATION_PENDING: &str = "pending";

/// One-to-one with an application: the persisted outcome of scoring the
/// resume against the job's keyword sets, or a pending marker when scoring
/// has not (yet) produced a result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchEvaluationRow {
    pub application_id: Uuid,
    pub status: String,
    pub score: Option<f64>,
    pub high_priority_ratio: Option<f64>,
    pub normal_ratio: Option<f64>,
    pub label: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-facing view of an application's evaluation: the scored outcome, or
/// a pending marker with the reason scoring has not produced one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EvaluationView {
    Scored {
        score: f64,
        high_priority_ratio: f64,
        normal_ratio: f64,
        label: MatchLabel,
    },
    Pending {
        reason: String,
    },
}

impl EvaluationView {
    pub fn pending(reason: &str) -> Self {
        EvaluationView::Pending {
            reason: reason.to_string(),
        }
    }

    pub fn from_row(row: &MatchEvaluationRow) -> Self {
        let scored = (
            row.score,
            row.high_priority_ratio,
            row.normal_ratio,
            row.label.as_deref().and_then(MatchLabel::parse),
        );
        match scored {
            (Some(score), Some(hp), Some(normal), Some(label))
                if row.status == EVALUATION_SCORED =>
            {
                EvaluationView::Scored {
                    score,
                    high_priority_ratio: hp,
                    normal_ratio: normal,
                    label,
                }
            }
            _ => EvaluationView::pending(
                row.failure_reason.as_deref().unwrap_or("scoring in progress"),
            ),
        }
    }
}
