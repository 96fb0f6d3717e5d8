use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An applicant row as persisted. `resume_url` stays NULL until the resume
/// artifact has been stored and attached.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub resume_url: Option<String>,
    pub experience_years: Option<f64>,
    pub education: Option<String>,
    pub current_company: Option<String>,
    pub current_role: Option<String>,
    pub expected_ctc: Option<f64>,
    pub notice_period_days: Option<i32>,
    pub skills: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Applicant contact and career fields supplied at intake, before any
/// identifier or resume pointer exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub experience_years: Option<f64>,
    pub education: Option<String>,
    pub current_company: Option<String>,
    pub current_role: Option<String>,
    pub expected_ctc: Option<f64>,
    pub notice_period_days: Option<i32>,
    pub skills: Option<String>,
    pub location: Option<String>,
}
