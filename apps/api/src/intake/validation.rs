//! Pre-write intake validation. Everything here runs before the first side
//! effect, so a rejected request leaves no applicant row, artifact, or
//! application behind.

use crate::errors::AppError;
use crate::intake::orchestrator::IntakeRequest;
use crate::storage::allowed_extension;

/// Validates a complete intake request. Collects every problem so the caller
/// sees one actionable message instead of a fix-resubmit loop per field.
pub fn validate_intake(request: &IntakeRequest) -> Result<(), AppError> {
    let mut problems: Vec<String> = Vec::new();

    if request.applicant.first_name.trim().is_empty() {
        problems.push("first_name is required".to_string());
    }
    if request.applicant.last_name.trim().is_empty() {
        problems.push("last_name is required".to_string());
    }
    if request.applicant.email.trim().is_empty() {
        problems.push("email is required".to_string());
    } else if !is_valid_email(request.applicant.email.trim()) {
        problems.push(format!("email '{}' is malformed", request.applicant.email));
    }
    if request.source.trim().is_empty() {
        problems.push("source is required".to_string());
    }
    if request.resume_filename.trim().is_empty() {
        problems.push("resume filename is required".to_string());
    } else if allowed_extension(&request.resume_filename).is_none() {
        problems.push(format!(
            "resume file '{}' has an unsupported type (expected pdf, docx, or txt)",
            request.resume_filename
        ));
    }
    if request.resume.is_empty() {
        problems.push("resume file is empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

/// Minimal structural email check: one `@`, non-empty local part, and a
/// dotted domain without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
