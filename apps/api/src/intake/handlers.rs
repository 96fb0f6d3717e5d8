use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::orchestrator::{IntakeOutcome, IntakeRequest};
use crate::models::applicant::{ApplicantFields, ApplicantRow};
use crate::models::application::{ApplicationRow, EvaluationView};
use crate::state::AppState;

/// POST /api/v1/applications
///
/// Multipart form: applicant fields + workflow metadata + a `resume` file
/// part. Maps the orchestrator outcome to 201 with identifiers and the
/// evaluation view.
pub async fn handle_create_application(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IntakeOutcome>), AppError> {
    let request = parse_intake_form(multipart).await?;
    let outcome = state.intake.clone().execute(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Serialize)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationRow,
    pub applicant: ApplicantRow,
    pub evaluation: EvaluationView,
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationDetailResponse>, AppError> {
    let application = state
        .repository
        .fetch_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    let applicant = state
        .repository
        .fetch_applicant(application.applicant_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "application {id} references a missing applicant"
            ))
        })?;

    let evaluation = state
        .repository
        .fetch_evaluation(id)
        .await?
        .as_ref()
        .map(EvaluationView::from_row)
        .unwrap_or_else(|| EvaluationView::pending("scoring in progress"));

    Ok(Json(ApplicationDetailResponse {
        application,
        applicant,
        evaluation,
    }))
}

/// GET /api/v1/applicants
pub async fn handle_list_applicants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicantRow>>, AppError> {
    Ok(Json(state.repository.list_applicants().await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart form mapping
// ────────────────────────────────────────────────────────────────────────────

async fn parse_intake_form(mut multipart: Multipart) -> Result<IntakeRequest, AppError> {
    let mut applicant = ApplicantFields::default();
    let mut job_id: Option<Uuid> = None;
    let mut source = String::new();
    let mut status = "pending".to_string();
    let mut assigned_hr = None;
    let mut assigned_manager = None;
    let mut comments = None;
    let mut resume: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "resume" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("could not read resume part: {e}")))?;
            resume = Some((filename, data));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("could not read field '{name}': {e}")))?;

        match name.as_str() {
            "job_id" => job_id = Some(parse_field("job_id", &value)?),
            "source" => source = value,
            "application_status" => status = value,
            "assigned_hr" => assigned_hr = non_empty(value),
            "assigned_manager" => assigned_manager = non_empty(value),
            "comments" => comments = non_empty(value),
            "first_name" => applicant.first_name = value,
            "last_name" => applicant.last_name = value,
            "email" => applicant.email = value,
            "phone" => applicant.phone = non_empty(value),
            "linkedin_url" => applicant.linkedin_url = non_empty(value),
            "experience_years" => {
                applicant.experience_years = parse_optional("experience_years", value)?
            }
            "education" => applicant.education = non_empty(value),
            "current_company" => applicant.current_company = non_empty(value),
            "current_role" => applicant.current_role = non_empty(value),
            "expected_ctc" => applicant.expected_ctc = parse_optional("expected_ctc", value)?,
            "notice_period_days" => {
                applicant.notice_period_days = parse_optional("notice_period_days", value)?
            }
            "skills" => applicant.skills = non_empty(value),
            "location" => applicant.location = non_empty(value),
            _ => {} // unknown parts are ignored
        }
    }

    let job_id =
        job_id.ok_or_else(|| AppError::Validation("job_id is required".to_string()))?;
    let (resume_filename, resume) =
        resume.ok_or_else(|| AppError::Validation("resume file part is required".to_string()))?;

    Ok(IntakeRequest {
        applicant,
        job_id,
        source,
        status,
        assigned_hr,
        assigned_manager,
        comments,
        resume_filename,
        resume,
    })
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_field<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::Validation(format!("field '{name}' is invalid: {e}")))
}

fn parse_optional<T>(name: &str, value: String) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(value) {
        Some(raw) => parse_field(name, &raw).map(Some),
        None => Ok(None),
    }
}
