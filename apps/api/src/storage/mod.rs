//! Resume Artifact Store — durable file persistence for uploaded resumes.
//!
//! Artifacts land at `<root>/<YYYY-MM>/<applicant_id>_<original_filename>`:
//! the year-month partition bounds directory size, the applicant id keys the
//! file so concurrent intakes never contend on one path. Writes go through a
//! temp file plus atomic rename, so a partially-written artifact is never
//! visible at its final location.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// File types accepted for resume uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported resume file type '{0}' (expected pdf, docx, or txt)")]
    InvalidType(String),

    #[error("artifact storage failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns the lowercased extension when the filename is on the allow-list.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Storage abstraction so the orchestrator can be exercised against fakes.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persists the blob and returns its location. Retrying with the same
    /// applicant id and filename overwrites rather than duplicates.
    async fn save(
        &self,
        blob: Bytes,
        applicant_id: Uuid,
        original_filename: &str,
    ) -> Result<String, StorageError>;

    /// Removes a stored artifact. Compensation support; callers treat
    /// failures as best-effort and log them.
    async fn delete(&self, location: &str) -> Result<(), StorageError>;
}

/// Filesystem-backed artifact store rooted at a configured directory.
pub struct FsResumeStore {
    root: PathBuf,
}

impl FsResumeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for FsResumeStore {
    async fn save(
        &self,
        blob: Bytes,
        applicant_id: Uuid,
        original_filename: &str,
    ) -> Result<String, StorageError> {
        if allowed_extension(original_filename).is_none() {
            return Err(StorageError::InvalidType(extension_of(original_filename)));
        }

        let partition = Utc::now().format("%Y-%m").to_string();
        let dir = self.root.join(&partition);
        let file_name = format!("{applicant_id}_{}", sanitize_filename(original_filename));
        let final_path = dir.join(&file_name);

        let written = tokio::task::spawn_blocking(move || -> Result<PathBuf, StorageError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&blob)?;
            tmp.flush()?;
            tmp.persist(&final_path).map_err(|e| StorageError::Io(e.error))?;
            Ok(final_path)
        })
        .await
        .map_err(std::io::Error::other)??;

        let location = written.to_string_lossy().into_owned();
        info!(%applicant_id, %location, "stored resume artifact");
        Ok(location)
    }

    async fn delete(&self, location: &str) -> Result<(), StorageError> {
        tokio::fs::remove_file(location).await?;
        info!(%location, "deleted resume artifact");
        Ok(())
    }
}

/// Keeps only the final path component of a client-supplied filename.
fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .to_string()
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("<none>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsResumeStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsResumeStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_writes_into_month_partition() {
        let (dir, store) = store();
        let id = Uuid::new_v4();

        let location = store
            .save(Bytes::from_static(b"resume body"), id, "cv.pdf")
            .await
            .unwrap();

        let expected = dir
            .path()
            .join(Utc::now().format("%Y-%m").to_string())
            .join(format!("{id}_cv.pdf"));
        assert_eq!(location, expected.to_string_lossy().as_ref());
        assert_eq!(std::fs::read(&expected).unwrap(), b"resume body");
    }

    #[tokio::test]
    async fn test_save_rejects_disallowed_extension_without_writing() {
        let (dir, store) = store();

        let err = store
            .save(Bytes::from_static(b"MZ"), Uuid::new_v4(), "malware.exe")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::InvalidType(ext) if ext == "exe"));
        // fail-fast: nothing may land on disk, not even the partition dir
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_save_rejects_missing_extension() {
        let (_dir, store) = store();
        let err = store
            .save(Bytes::from_static(b"text"), Uuid::new_v4(), "resume")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidType(_)));
    }

    #[tokio::test]
    async fn test_retry_overwrites_instead_of_duplicating() {
        let (dir, store) = store();
        let id = Uuid::new_v4();

        store
            .save(Bytes::from_static(b"first"), id, "cv.txt")
            .await
            .unwrap();
        let location = store
            .save(Bytes::from_static(b"second"), id, "cv.txt")
            .await
            .unwrap();

        assert_eq!(std::fs::read(&location).unwrap(), b"second");
        let partition = dir.path().join(Utc::now().format("%Y-%m").to_string());
        assert_eq!(std::fs::read_dir(partition).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_artifact() {
        let (_dir, store) = store();
        let id = Uuid::new_v4();
        let location = store
            .save(Bytes::from_static(b"body"), id, "cv.txt")
            .await
            .unwrap();

        store.delete(&location).await.unwrap();
        assert!(!Path::new(&location).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_artifact_is_an_error_for_caller_to_log() {
        let (_dir, store) = store();
        assert!(store.delete("/nonexistent/path.txt").await.is_err());
    }

    #[test]
    fn test_sanitize_strips_client_supplied_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd.txt"), "passwd.txt");
        assert_eq!(sanitize_filename(r"C:\Users\x\cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_filename("cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_allowed_extension_is_case_insensitive() {
        assert_eq!(allowed_extension("CV.PDF"), Some("pdf".to_string()));
        assert_eq!(allowed_extension("notes.TxT"), Some("txt".to_string()));
        assert_eq!(allowed_extension("shell.sh"), None);
        assert_eq!(allowed_extension("noext"), None);
    }
}
