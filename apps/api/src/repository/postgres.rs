use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::applicant::{ApplicantFields, ApplicantRow};
use crate::models::application::{ApplicationRow, MatchEvaluationRow, NewApplication};
use crate::models::job::{split_keywords, JobRequirements};

use super::{ApplicantRepository, EvaluationUpsert, RepositoryError};

/// PostgreSQL-backed repository. Ids are `Uuid::new_v4()` assigned before the
/// INSERT, so the generated identifier is known without any backend-specific
/// last-insert-id mechanism.
pub struct PgApplicantRepository {
    pool: PgPool,
}

impl PgApplicantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicantRepository for PgApplicantRepository {
    async fn create_applicant(&self, fields: &ApplicantFields) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO applicants
                (id, first_name, last_name, email, phone, linkedin_url, resume_url,
                 experience_years, education, current_company, current_role,
                 expected_ctc, notice_period_days, skills, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            "#,
        )
        .bind(id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.linkedin_url)
        .bind(fields.experience_years)
        .bind(&fields.education)
        .bind(&fields.current_company)
        .bind(&fields.current_role)
        .bind(fields.expected_ctc)
        .bind(fields.notice_period_days)
        .bind(&fields.skills)
        .bind(&fields.location)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(applicant_id = %id, "inserted applicant");
        Ok(id)
    }

    async fn delete_applicant(&self, applicant_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM applicants WHERE id = $1")
            .bind(applicant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        info!(%applicant_id, "removed applicant row");
        Ok(())
    }

    async fn attach_resume(
        &self,
        applicant_id: Uuid,
        location: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE applicants SET resume_url = $2, updated_at = $3 WHERE id = $1")
                .bind(applicant_id)
                .bind(location)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_application(
        &self,
        application: &NewApplication,
    ) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, applicant_id, job_id, status, source,
                 assigned_hr, assigned_manager, comments, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            "#,
        )
        .bind(id)
        .bind(application.applicant_id)
        .bind(application.job_id)
        .bind(&application.status)
        .bind(&application.source)
        .bind(&application.assigned_hr)
        .bind(&application.assigned_manager)
        .bind(&application.comments)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
            _ => RepositoryError::Backend(e),
        })?;

        info!(application_id = %id, applicant_id = %application.applicant_id, "inserted application");
        Ok(id)
    }

    async fn fetch_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Option<ApplicantRow>, RepositoryError> {
        Ok(
            sqlx::query_as::<_, ApplicantRow>("SELECT * FROM applicants WHERE id = $1")
                .bind(applicant_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn fetch_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRow>, RepositoryError> {
        Ok(
            sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
                .bind(application_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_applicants(&self) -> Result<Vec<ApplicantRow>, RepositoryError> {
        Ok(
            sqlx::query_as::<_, ApplicantRow>(
                "SELECT * FROM applicants ORDER BY created_at DESC",
            )
            .fetch_all(&self.pool)
            .await?,
        )
    }

    async fn fetch_job_requirements(
        &self,
        job_id: Uuid,
    ) -> Result<Option<JobRequirements>, RepositoryError> {
        let row: Option<(Uuid, String, String, String)> = sqlx::query_as(
            "SELECT id, jd, key_skills, additional_skills FROM jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, jd, key_skills, additional_skills)| JobRequirements {
            job_id: id,
            jd_text: jd,
            high_priority_keywords: split_keywords(&key_skills),
            normal_keywords: split_keywords(&additional_skills),
        }))
    }

    async fn persist_evaluation(
        &self,
        evaluation: &EvaluationUpsert,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO match_evaluations
                (application_id, status, score, high_priority_ratio, normal_ratio,
                 label, failure_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (application_id) DO UPDATE SET
                status = EXCLUDED.status,
                score = EXCLUDED.score,
                high_priority_ratio = EXCLUDED.high_priority_ratio,
                normal_ratio = EXCLUDED.normal_ratio,
                label = EXCLUDED.label,
                failure_reason = EXCLUDED.failure_reason,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(evaluation.application_id)
        .bind(&evaluation.status)
        .bind(evaluation.score)
        .bind(evaluation.high_priority_ratio)
        .bind(evaluation.normal_ratio)
        .bind(&evaluation.label)
        .bind(&evaluation.failure_reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_evaluation(
        &self,
        application_id: Uuid,
    ) -> Result<Option<MatchEvaluationRow>, RepositoryError> {
        Ok(sqlx::query_as::<_, MatchEvaluationRow>(
            "SELECT * FROM match_evaluations WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
