//! Intake Orchestrator — drives one application intake end to end:
//! validate → persist applicant → store resume → persist application →
//! dispatch scoring → assemble result.
//!
//! The applicant row, the resume file, and the application row live in
//! resources with no shared commit protocol, so consistency is kept by
//! compensation: when a required stage fails, every earlier write is undone
//! before the failure surfaces. Scoring is not a required stage — once the
//! application is durably on file, a scoring failure only leaves the
//! evaluation pending.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::validation::validate_intake;
use crate::models::applicant::ApplicantFields;
use crate::models::application::{EvaluationView, NewApplication};
use crate::repository::{ApplicantRepository, EvaluationUpsert};
use crate::scoring::worker::ScoringJob;
use crate::storage::ArtifactStore;

/// Everything one intake needs: applicant fields, workflow metadata, and the
/// resume blob as received from the multipart layer.
#[derive(Debug, Clone)]
pub struct IntakeRequest {
    pub applicant: ApplicantFields,
    pub job_id: Uuid,
    pub source: String,
    pub status: String,
    pub assigned_hr: Option<String>,
    pub assigned_manager: Option<String>,
    pub comments: Option<String>,
    pub resume_filename: String,
    pub resume: Bytes,
}

/// Result of a completed intake. `evaluation` is the scored outcome when the
/// worker replied in time, otherwise the pending marker.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub applicant_id: Uuid,
    pub application_id: Uuid,
    pub resume_url: String,
    pub evaluation: EvaluationView,
}

pub struct IntakeOrchestrator {
    repository: Arc<dyn ApplicantRepository>,
    resumes: Arc<dyn ArtifactStore>,
    scoring: mpsc::Sender<ScoringJob>,
    stage_timeout: Duration,
    scoring_reply_timeout: Duration,
}

impl IntakeOrchestrator {
    pub fn new(
        repository: Arc<dyn ApplicantRepository>,
        resumes: Arc<dyn ArtifactStore>,
        scoring: mpsc::Sender<ScoringJob>,
        stage_timeout: Duration,
        scoring_reply_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            resumes,
            scoring,
            stage_timeout,
            scoring_reply_timeout,
        }
    }

    /// Runs the saga to a definite success or failure. The body executes in a
    /// spawned task: a client that disconnects mid-request cannot abort a
    /// stage that has already started writing.
    pub async fn execute(self: Arc<Self>, request: IntakeRequest) -> Result<IntakeOutcome, AppError> {
        let this = Arc::clone(&self);
        tokio::spawn(async move { this.run(request).await })
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("intake task failed: {e}")))?
    }

    async fn run(&self, request: IntakeRequest) -> Result<IntakeOutcome, AppError> {
        validate_intake(&request)?;

        let applicant_id = self
            .stage(
                "persist applicant",
                self.repository.create_applicant(&request.applicant),
            )
            .await?;

        let resume_url = match self
            .stage(
                "store resume",
                self.resumes
                    .save(request.resume.clone(), applicant_id, &request.resume_filename),
            )
            .await
        {
            Ok(location) => location,
            Err(err) => {
                self.discard_applicant(applicant_id).await;
                return Err(err);
            }
        };

        let new_application = NewApplication {
            applicant_id,
            job_id: request.job_id,
            status: request.status.clone(),
            source: request.source.clone(),
            assigned_hr: request.assigned_hr.clone(),
            assigned_manager: request.assigned_manager.clone(),
            comments: request.comments.clone(),
        };
        let application_id = match self
            .persist_application(applicant_id, &resume_url, &new_application)
            .await
        {
            Ok(id) => id,
            Err(err) => {
                self.discard_artifact(&resume_url).await;
                self.discard_applicant(applicant_id).await;
                return Err(err);
            }
        };

        // The intake is durable from here on; scoring can only degrade.
        let evaluation = self
            .dispatch_scoring(application_id, request.job_id, resume_url.clone())
            .await;

        info!(%applicant_id, %application_id, "intake complete");
        Ok(IntakeOutcome {
            applicant_id,
            application_id,
            resume_url,
            evaluation,
        })
    }

    /// Attaches the resume pointer and writes the application row. Both
    /// belong to the APPLICATION_PERSISTED stage: a failure of either rolls
    /// the whole intake back via the caller's compensation.
    async fn persist_application(
        &self,
        applicant_id: Uuid,
        resume_url: &str,
        application: &NewApplication,
    ) -> Result<Uuid, AppError> {
        self.stage(
            "attach resume",
            self.repository.attach_resume(applicant_id, resume_url),
        )
        .await?;
        self.stage(
            "persist application",
            self.repository.create_application(application),
        )
        .await
    }

    /// Bounds a blocking stage; an elapsed timeout is a stage failure and
    /// takes the same compensation path.
    async fn stage<T, E>(
        &self,
        name: &'static str,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, AppError>
    where
        E: Into<AppError>,
    {
        match tokio::time::timeout(self.stage_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(AppError::StageTimeout(name)),
        }
    }

    async fn discard_applicant(&self, applicant_id: Uuid) {
        if let Err(err) = self.repository.delete_applicant(applicant_id).await {
            warn!(%applicant_id, "compensation could not remove applicant row: {err}");
        }
    }

    async fn discard_artifact(&self, location: &str) {
        if let Err(err) = self.resumes.delete(location).await {
            warn!(%location, "compensation could not remove resume artifact: {err}");
        }
    }

    /// Records the pending evaluation, hands the job to the scoring worker,
    /// and waits a bounded time for its reply. Every failure mode resolves to
    /// the pending view — never to an intake failure.
    async fn dispatch_scoring(
        &self,
        application_id: Uuid,
        job_id: Uuid,
        resume_location: String,
    ) -> EvaluationView {
        let pending = EvaluationUpsert::pending(application_id, "scoring in progress");
        if let Err(err) = self.repository.persist_evaluation(&pending).await {
            warn!(%application_id, "could not record pending evaluation: {err}");
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = ScoringJob {
            application_id,
            job_id,
            resume_location,
            reply: Some(reply_tx),
        };
        if self.scoring.send(job).await.is_err() {
            warn!(%application_id, "scoring worker unavailable; evaluation stays pending");
            return EvaluationView::pending("scoring worker unavailable");
        }

        match tokio::time::timeout(self.scoring_reply_timeout, reply_rx).await {
            Ok(Ok(view)) => view,
            // Worker still busy or its reply channel dropped: the evaluation
            // row will catch up on its own; report pending now.
            Ok(Err(_)) | Err(_) => EvaluationView::pending("scoring in progress"),
        }
    }
}
