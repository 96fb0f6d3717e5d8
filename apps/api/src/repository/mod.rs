//! Applicant/Application Repository — the persistence contract the
//! orchestrator and scoring worker depend on.
//!
//! Identifiers are generated by the repository and returned synchronously,
//! whatever the backend. Cross-step consistency is the orchestrator's job via
//! compensation; each contract call is a single local transaction.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::applicant::{ApplicantFields, ApplicantRow};
use crate::models::application::{
    ApplicationRow, MatchEvaluationRow, NewApplication, EVALUATION_PENDING, EVALUATION_SCORED,
};
use crate::models::job::JobRequirements;
use crate::scoring::MatchOutcome;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("an application for this applicant and job already exists")]
    Conflict,

    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

/// Evaluation fields written by `persist_evaluation`. One row per
/// application; a re-evaluation overwrites the previous outcome.
#[derive(Debug, Clone)]
pub struct EvaluationUpsert {
    pub application_id: Uuid,
    pub status: String,
    pub score: Option<f64>,
    pub high_priority_ratio: Option<f64>,
    pub normal_ratio: Option<f64>,
    pub label: Option<String>,
    pub failure_reason: Option<String>,
}

impl EvaluationUpsert {
    pub fn scored(application_id: Uuid, outcome: &MatchOutcome) -> Self {
        Self {
            application_id,
            status: EVALUATION_SCORED.to_string(),
            score: Some(outcome.score),
            high_priority_ratio: Some(outcome.high_priority_ratio),
            normal_ratio: Some(outcome.normal_ratio),
            label: Some(outcome.label.as_str().to_string()),
            failure_reason: None,
        }
    }

    pub fn pending(application_id: Uuid, reason: &str) -> Self {
        Self {
            application_id,
            status: EVALUATION_PENDING.to_string(),
            score: None,
            high_priority_ratio: None,
            normal_ratio: None,
            label: None,
            failure_reason: Some(reason.to_string()),
        }
    }
}

/// Persistence contract for applicants, applications, job requirements, and
/// evaluations. One implementation per backend; callers never see storage
/// technology.
#[async_trait]
pub trait ApplicantRepository: Send + Sync {
    /// Inserts a new applicant (resume pointer NULL) and returns its
    /// generated id.
    async fn create_applicant(&self, fields: &ApplicantFields) -> Result<Uuid, RepositoryError>;

    /// Removes an applicant row. Compensation support.
    async fn delete_applicant(&self, applicant_id: Uuid) -> Result<(), RepositoryError>;

    /// Points an existing applicant at its stored resume artifact.
    async fn attach_resume(
        &self,
        applicant_id: Uuid,
        location: &str,
    ) -> Result<(), RepositoryError>;

    /// Inserts an application row and returns its generated id. A duplicate
    /// `(applicant, job)` pair is a `Conflict`.
    async fn create_application(
        &self,
        application: &NewApplication,
    ) -> Result<Uuid, RepositoryError>;

    async fn fetch_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicantRow>, RepositoryError>;

    async fn fetch_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRow>, RepositoryError>;

    async fn list_applicants(&self) -> Result<Vec<ApplicantRow>, RepositoryError>;

    /// Reads a job's description and keyword sets. `None` when the job id is
    /// unknown.
    async fn fetch_job_requirements(
        &self,
        job_id: Uuid,
    ) -> Result<Option<JobRequirements>, RepositoryError>;

    /// Writes (or overwrites) the evaluation for an application.
    async fn persist_evaluation(
        &self,
        evaluation: &EvaluationUpsert,
    ) -> Result<(), RepositoryError>;

    async fn fetch_evaluation(
        &self,
        application_id: Uuid,
    ) -> Result<Option<MatchEvaluationRow>, RepositoryError>;
}
