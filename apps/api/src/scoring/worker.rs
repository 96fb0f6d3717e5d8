//! Scoring worker — consumes scoring jobs off a task channel, decoupled from
//! the intake write path.
//!
//! The orchestrator dispatches a job after the applicant and application are
//! durably committed. Whatever happens here — unknown job, unreadable resume,
//! persistence trouble, even a worker crash — the committed intake stands;
//! the evaluation is simply left pending with a recorded reason.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extraction::TextExtractor;
use crate::models::application::EvaluationView;
use crate::repository::{ApplicantRepository, EvaluationUpsert};
use crate::scoring::{score_resume, MatchConfig};

/// One unit of scoring work. `reply` lets a waiting intake request receive
/// the evaluation view; a worker never requires anyone to be listening.
pub struct ScoringJob {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub resume_location: String,
    pub reply: Option<oneshot::Sender<EvaluationView>>,
}

/// Spawns the scoring worker task and returns the sender side of its queue.
pub fn spawn_scoring_worker(
    repository: Arc<dyn ApplicantRepository>,
    extractor: Arc<dyn TextExtractor>,
    config: MatchConfig,
) -> mpsc::Sender<ScoringJob> {
    let (tx, mut rx) = mpsc::channel::<ScoringJob>(64);

    tokio::spawn(async move {
        while let Some(mut job) = rx.recv().await {
            let reply = job.reply.take();
            let view = process_job(repository.as_ref(), extractor.as_ref(), &config, &job).await;
            if let Some(reply) = reply {
                // The intake request may have stopped waiting; that's fine.
                let _ = reply.send(view);
            }
        }
        info!("scoring worker shut down");
    });

    tx
}

async fn process_job(
    repository: &dyn ApplicantRepository,
    extractor: &dyn TextExtractor,
    config: &MatchConfig,
    job: &ScoringJob,
) -> EvaluationView {
    match evaluate(repository, extractor, config, job).await {
        Ok(view) => view,
        Err(reason) => {
            warn!(
                application_id = %job.application_id,
                %reason,
                "scoring degraded; evaluation stays pending"
            );
            let pending = EvaluationUpsert::pending(job.application_id, &reason);
            if let Err(err) = repository.persist_evaluation(&pending).await {
                error!(
                    application_id = %job.application_id,
                    "could not record pending evaluation: {err}"
                );
            }
            EvaluationView::pending(&reason)
        }
    }
}

/// The scoring pipeline proper. Every failure is reduced to a human-readable
/// reason string recorded on the pending evaluation.
async fn evaluate(
    repository: &dyn ApplicantRepository,
    extractor: &dyn TextExtractor,
    config: &MatchConfig,
    job: &ScoringJob,
) -> Result<EvaluationView, String> {
    let requirements = repository
        .fetch_job_requirements(job.job_id)
        .await
        .map_err(|e| format!("job requirements unavailable: {e}"))?
        .ok_or_else(|| format!("job {} not found", job.job_id))?;

    let resume_text = extractor
        .extract_text(&job.resume_location)
        .await
        .map_err(|e| e.to_string())?;

    let outcome = score_resume(&resume_text, &requirements, config);

    repository
        .persist_evaluation(&EvaluationUpsert::scored(job.application_id, &outcome))
        .await
        .map_err(|e| format!("evaluation not persisted: {e}"))?;

    info!(
        application_id = %job.application_id,
        score = outcome.score,
        label = outcome.label.as_str(),
        "scored application"
    );

    Ok(EvaluationView::Scored {
        score: outcome.score,
        high_priority_ratio: outcome.high_priority_ratio,
        normal_ratio: outcome.normal_ratio,
        label: outcome.label,
    })
}
