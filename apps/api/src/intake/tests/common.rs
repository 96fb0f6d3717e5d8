use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::extraction::{ExtractionError, TextExtractor};
use crate::intake::orchestrator::{IntakeOrchestrator, IntakeRequest};
use crate::models::applicant::{ApplicantFields, ApplicantRow};
use crate::models::application::{
    ApplicationRow, MatchEvaluationRow, NewApplication, EVALUATION_PENDING,
};
use crate::models::job::JobRequirements;
use crate::repository::{ApplicantRepository, EvaluationUpsert, RepositoryError};
use crate::scoring::worker::spawn_scoring_worker;
use crate::scoring::MatchConfig;
use crate::storage::{ArtifactStore, StorageError};

// ────────────────────────────────────────────────────────────────────────────
// In-memory repository
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(super) struct MemoryRepository {
    pub(super) applicants: Mutex<HashMap<Uuid, ApplicantRow>>,
    pub(super) applications: Mutex<HashMap<Uuid, ApplicationRow>>,
    pub(super) evaluations: Mutex<HashMap<Uuid, MatchEvaluationRow>>,
    pub(super) jobs: Mutex<HashMap<Uuid, JobRequirements>>,
    /// When set, the next `create_application` fails with this error.
    pub(super) application_failure: Mutex<Option<RepositoryError>>,
    /// When true, `attach_resume` fails.
    pub(super) fail_attach: Mutex<bool>,
}

impl MemoryRepository {
    pub(super) fn seed_job(&self, high: &[&str], normal: &[&str]) -> Uuid {
        let job_id = Uuid::new_v4();
        self.jobs.lock().expect("jobs mutex").insert(
            job_id,
            JobRequirements {
                job_id,
                jd_text: "Data engineer role".to_string(),
                high_priority_keywords: to_set(high),
                normal_keywords: to_set(normal),
            },
        );
        job_id
    }

    pub(super) fn applicant_count(&self) -> usize {
        self.applicants.lock().expect("applicants mutex").len()
    }

    pub(super) fn application_count(&self) -> usize {
        self.applications.lock().expect("applications mutex").len()
    }

    pub(super) fn evaluation(&self, application_id: Uuid) -> Option<MatchEvaluationRow> {
        self.evaluations
            .lock()
            .expect("evaluations mutex")
            .get(&application_id)
            .cloned()
    }
}

fn to_set(keywords: &[&str]) -> BTreeSet<String> {
    keywords.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ApplicantRepository for MemoryRepository {
    async fn create_applicant(&self, fields: &ApplicantFields) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let row = ApplicantRow {
            id,
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            linkedin_url: fields.linkedin_url.clone(),
            resume_url: None,
            experience_years: fields.experience_years,
            education: fields.education.clone(),
            current_company: fields.current_company.clone(),
            current_role: fields.current_role.clone(),
            expected_ctc: fields.expected_ctc,
            notice_period_days: fields.notice_period_days,
            skills: fields.skills.clone(),
            location: fields.location.clone(),
            created_at: now,
            updated_at: now,
        };
        self.applicants.lock().expect("applicants mutex").insert(id, row);
        Ok(id)
    }

    async fn delete_applicant(&self, applicant_id: Uuid) -> Result<(), RepositoryError> {
        self.applicants
            .lock()
            .expect("applicants mutex")
            .remove(&applicant_id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn attach_resume(
        &self,
        applicant_id: Uuid,
        location: &str,
    ) -> Result<(), RepositoryError> {
        if *self.fail_attach.lock().expect("flag mutex") {
            return Err(RepositoryError::Backend(sqlx::Error::PoolClosed));
        }
        let mut guard = self.applicants.lock().expect("applicants mutex");
        let row = guard.get_mut(&applicant_id).ok_or(RepositoryError::NotFound)?;
        row.resume_url = Some(location.to_string());
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn create_application(
        &self,
        application: &NewApplication,
    ) -> Result<Uuid, RepositoryError> {
        if let Some(err) = self.application_failure.lock().expect("flag mutex").take() {
            return Err(err);
        }
        let mut guard = self.applications.lock().expect("applications mutex");
        let duplicate = guard.values().any(|row| {
            row.applicant_id == application.applicant_id && row.job_id == application.job_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        let id = Uuid::new_v4();
        let now = Utc::now();
        guard.insert(
            id,
            ApplicationRow {
                id,
                applicant_id: application.applicant_id,
                job_id: application.job_id,
                status: application.status.clone(),
                source: application.source.clone(),
                assigned_hr: application.assigned_hr.clone(),
                assigned_manager: application.assigned_manager.clone(),
                comments: application.comments.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn fetch_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicantRow>, RepositoryError> {
        Ok(self
            .applicants
            .lock()
            .expect("applicants mutex")
            .get(&applicant_id)
            .cloned())
    }

    async fn fetch_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRow>, RepositoryError> {
        Ok(self
            .applications
            .lock()
            .expect("applications mutex")
            .get(&application_id)
            .cloned())
    }

    async fn list_applicants(&self) -> Result<Vec<ApplicantRow>, RepositoryError> {
        Ok(self
            .applicants
            .lock()
            .expect("applicants mutex")
            .values()
            .cloned()
            .collect())
    }

    async fn fetch_job_requirements(
        &self,
        job_id: Uuid,
    ) -> Result<Option<JobRequirements>, RepositoryError> {
        Ok(self.jobs.lock().expect("jobs mutex").get(&job_id).cloned())
    }

    async fn persist_evaluation(
        &self,
        evaluation: &EvaluationUpsert,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        self.evaluations.lock().expect("evaluations mutex").insert(
            evaluation.application_id,
            MatchEvaluationRow {
                application_id: evaluation.application_id,
                status: evaluation.status.clone(),
                score: evaluation.score,
                high_priority_ratio: evaluation.high_priority_ratio,
                normal_ratio: evaluation.normal_ratio,
                label: evaluation.label.clone(),
                failure_reason: evaluation.failure_reason.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn fetch_evaluation(
        &self,
        application_id: Uuid,
    ) -> Result<Option<MatchEvaluationRow>, RepositoryError> {
        Ok(self.evaluation(application_id))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Artifact store fakes
// ────────────────────────────────────────────────────────────────────────────

/// Records saved blobs in memory so tests can assert compensation deletes.
#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) artifacts: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub(super) fn artifact_count(&self) -> usize {
        self.artifacts.lock().expect("artifacts mutex").len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn save(
        &self,
        blob: Bytes,
        applicant_id: Uuid,
        original_filename: &str,
    ) -> Result<String, StorageError> {
        let location = format!("mem://{applicant_id}_{original_filename}");
        self.artifacts
            .lock()
            .expect("artifacts mutex")
            .insert(location.clone(), blob.to_vec());
        Ok(location)
    }

    async fn delete(&self, location: &str) -> Result<(), StorageError> {
        self.artifacts
            .lock()
            .expect("artifacts mutex")
            .remove(location)
            .map(|_| ())
            .ok_or_else(|| StorageError::Io(std::io::Error::other("no such artifact")))
    }
}

/// Always fails to save, standing in for a full disk or unreachable volume.
pub(super) struct FailingStore;

#[async_trait]
impl ArtifactStore for FailingStore {
    async fn save(&self, _: Bytes, _: Uuid, _: &str) -> Result<String, StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }

    async fn delete(&self, _: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor fakes
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed resume text regardless of location.
pub(super) struct StaticExtractor(pub(super) &'static str);

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract_text(&self, _location: &str) -> Result<String, ExtractionError> {
        Ok(self.0.to_string())
    }
}

/// Fails every extraction, standing in for a corrupt upload.
pub(super) struct UnreadableExtractor;

#[async_trait]
impl TextExtractor for UnreadableExtractor {
    async fn extract_text(&self, _location: &str) -> Result<String, ExtractionError> {
        Err(ExtractionError::Unreadable("corrupt stream".to_string()))
    }
}

/// Stalls before answering, so an orchestrator with a short reply timeout
/// stops waiting while the worker still finishes the evaluation.
pub(super) struct SlowExtractor {
    pub(super) delay: Duration,
    pub(super) text: &'static str,
}

#[async_trait]
impl TextExtractor for SlowExtractor {
    async fn extract_text(&self, _location: &str) -> Result<String, ExtractionError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.text.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

pub(super) fn intake_request(job_id: Uuid) -> IntakeRequest {
    IntakeRequest {
        applicant: ApplicantFields {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            skills: Some("python, sql".to_string()),
            ..ApplicantFields::default()
        },
        job_id,
        source: "careers-page".to_string(),
        status: "pending".to_string(),
        assigned_hr: Some("hr-7".to_string()),
        assigned_manager: None,
        comments: None,
        resume_filename: "grace_cv.pdf".to_string(),
        resume: Bytes::from_static(b"%PDF-1.4 resume body"),
    }
}

pub(super) fn orchestrator(
    repository: Arc<MemoryRepository>,
    store: Arc<dyn ArtifactStore>,
    extractor: Arc<dyn TextExtractor>,
    reply_timeout: Duration,
) -> Arc<IntakeOrchestrator> {
    let scoring = spawn_scoring_worker(
        repository.clone() as Arc<dyn ApplicantRepository>,
        extractor,
        MatchConfig::default(),
    );
    Arc::new(IntakeOrchestrator::new(
        repository,
        store,
        scoring,
        Duration::from_secs(5),
        reply_timeout,
    ))
}

pub(super) const PENDING: &str = EVALUATION_PENDING;
