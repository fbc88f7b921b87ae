//! Flat-file document store: jobs as JSON, CVs as markdown, matrices and
//! match reports as JSON, all under one data directory.
//!
//! Ids are slugged into file names. Saving under an id that is not already a
//! slug fails when its slug is taken, so two spellings never share a file.
//!
//! `AppState` holds an `Arc<dyn DocumentStore>` so handlers never touch paths.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::models::JobInput;
use crate::errors::AppError;
use crate::matching::calculator::ComprehensiveMatch;
use crate::matching::matrix::{CvMatrix, JobMatrix};

const JOBS_DIR: &str = "jobs";
const CVS_DIR: &str = "cvs";
const JOB_MATRICES_DIR: &str = "matrices/jobs";
const CV_MATRICES_DIR: &str = "matrices/cvs";
const MATCHES_DIR: &str = "matches";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists a job and returns its id (assigned when the job has none).
    async fn save_job(&self, job: &JobInput) -> Result<String, AppError>;
    async fn load_job(&self, id: &str) -> Result<JobInput, AppError>;
    async fn list_jobs(&self) -> Result<Vec<JobInput>, AppError>;

    async fn save_cv(&self, id: &str, content: &str) -> Result<String, AppError>;
    async fn load_cv(&self, id: &str) -> Result<String, AppError>;

    async fn save_job_matrix(&self, matrix: &JobMatrix) -> Result<(), AppError>;
    async fn load_job_matrix(&self, id: &str) -> Result<JobMatrix, AppError>;
    async fn save_cv_matrix(&self, matrix: &CvMatrix) -> Result<(), AppError>;
    async fn load_cv_matrix(&self, id: &str) -> Result<CvMatrix, AppError>;

    async fn save_match(&self, report: &ComprehensiveMatch) -> Result<(), AppError>;
}

/// Store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the directory layout if missing.
    pub async fn init(&self) -> Result<(), AppError> {
        for dir in [JOBS_DIR, CVS_DIR, JOB_MATRICES_DIR, CV_MATRICES_DIR, MATCHES_DIR] {
            fs::create_dir_all(self.root.join(dir)).await?;
        }
        info!("Document store ready at {}", self.root.display());
        Ok(())
    }

    fn path(&self, dir: &str, id: &str, extension: &str) -> Result<PathBuf, AppError> {
        let slug = slugify(id);
        if slug.is_empty() {
            return Err(AppError::Validation(format!("'{id}' is not a usable identifier")));
        }
        Ok(self.root.join(dir).join(format!("{slug}.{extension}")))
    }

    /// Rejects `id` when it is not in slug form and its slug already names a document.
    async fn ensure_unclaimed(&self, path: &Path, what: &str, id: &str) -> Result<(), AppError> {
        let slug = slugify(id);
        if slug != id && fs::try_exists(path).await? {
            return Err(AppError::Validation(format!(
                "{what} id '{id}' collides with stored '{slug}'; use '{slug}' to replace it"
            )));
        }
        Ok(())
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        debug!("Written {}", path.display());
        Ok(())
    }

    async fn read(&self, path: &Path, what: &str, id: &str) -> Result<String, AppError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("{what} '{id}' not found")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize + Sync>(
        &self,
        dir: &str,
        id: &str,
        value: &T,
    ) -> Result<(), AppError> {
        let path = self.path(dir, id, "json")?;
        let content = serde_json::to_string_pretty(value)?;
        self.write(&path, &content).await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        dir: &str,
        id: &str,
        what: &str,
    ) -> Result<T, AppError> {
        let path = self.path(dir, id, "json")?;
        let content = self.read(&path, what, id).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn save_job(&self, job: &JobInput) -> Result<String, AppError> {
        let id = match job.id.as_deref().filter(|raw| !slugify(raw).is_empty()) {
            Some(raw) => {
                self.ensure_unclaimed(&self.path(JOBS_DIR, raw, "json")?, "Job", raw)
                    .await?;
                slugify(raw)
            }
            None => Uuid::new_v4().to_string(),
        };

        let mut stored = job.clone();
        stored.id = Some(id.clone());
        self.write_json(JOBS_DIR, &id, &stored).await?;
        info!(job_id = %id, title = %job.title, "job stored");
        Ok(id)
    }

    async fn load_job(&self, id: &str) -> Result<JobInput, AppError> {
        self.read_json(JOBS_DIR, id, "Job").await
    }

    async fn list_jobs(&self) -> Result<Vec<JobInput>, AppError> {
        let dir = self.root.join(JOBS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut jobs = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path).await?;
            jobs.push(serde_json::from_str(&content)?);
        }
        Ok(jobs)
    }

    async fn save_cv(&self, id: &str, content: &str) -> Result<String, AppError> {
        let path = self.path(CVS_DIR, id, "md")?;
        self.ensure_unclaimed(&path, "CV", id).await?;
        self.write(&path, content).await?;
        let slug = slugify(id);
        info!(cv_id = %slug, "cv stored");
        Ok(slug)
    }

    async fn load_cv(&self, id: &str) -> Result<String, AppError> {
        let path = self.path(CVS_DIR, id, "md")?;
        self.read(&path, "CV", id).await
    }

    async fn save_job_matrix(&self, matrix: &JobMatrix) -> Result<(), AppError> {
        self.write_json(JOB_MATRICES_DIR, &matrix.matrix_id, matrix).await
    }

    async fn load_job_matrix(&self, id: &str) -> Result<JobMatrix, AppError> {
        self.read_json(JOB_MATRICES_DIR, id, "Job matrix").await
    }

    async fn save_cv_matrix(&self, matrix: &CvMatrix) -> Result<(), AppError> {
        self.write_json(CV_MATRICES_DIR, &matrix.matrix_id, matrix).await
    }

    async fn load_cv_matrix(&self, id: &str) -> Result<CvMatrix, AppError> {
        self.read_json(CV_MATRICES_DIR, id, "CV matrix").await
    }

    async fn save_match(&self, report: &ComprehensiveMatch) -> Result<(), AppError> {
        self.write_json(MATCHES_DIR, &report.match_id, report).await
    }
}

/// Lower-cases and maps anything outside `[a-z0-9]` to single dashes.
pub fn slugify(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matrix::{generate_cv_matrix, generate_job_matrix};

    fn job(id: Option<&str>, title: &str) -> JobInput {
        JobInput {
            id: id.map(str::to_string),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: "python and aws".to_string(),
            ..JobInput::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Senior Engineer @ ACME  "), "senior-engineer-acme");
        assert_eq!(slugify("../../etc/passwd"), "etc-passwd");
        assert_eq!(slugify("///"), "");
    }

    #[tokio::test]
    async fn test_job_round_trip_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.init().await.unwrap();

        let id = store.save_job(&job(Some("Backend Role"), "Backend")).await.unwrap();
        assert_eq!(id, "backend-role");
        let generated = store.save_job(&job(None, "Frontend")).await.unwrap();
        assert!(!generated.is_empty());

        let loaded = store.load_job("backend-role").await.unwrap();
        assert_eq!(loaded.title, "Backend");
        assert_eq!(loaded.id.as_deref(), Some("backend-role"));

        let all = store.list_jobs().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_documents_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.load_cv("nobody").await, Err(AppError::NotFound(_))));
        assert!(matches!(store.load_job("nothing").await, Err(AppError::NotFound(_))));
        assert!(store.list_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cv_and_matrix_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let cv_id = store.save_cv("Jane Doe", "# Jane\nPython").await.unwrap();
        assert_eq!(cv_id, "jane-doe");
        assert_eq!(store.load_cv("jane-doe").await.unwrap(), "# Jane\nPython");

        let matrix = generate_job_matrix(&[job(Some("a"), "Engineer")]);
        store.save_job_matrix(&matrix).await.unwrap();
        let loaded = store.load_job_matrix(&matrix.matrix_id).await.unwrap();
        assert_eq!(loaded.parameters, matrix.parameters);
        assert_eq!(loaded.weight_matrix, matrix.weight_matrix);
    }

    #[tokio::test]
    async fn test_matrix_kinds_do_not_share_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let cv_matrix = generate_cv_matrix("Python developer", "jane", &Default::default());
        store.save_cv_matrix(&cv_matrix).await.unwrap();
        assert!(matches!(
            store.load_job_matrix(&cv_matrix.matrix_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.load_cv_matrix(&cv_matrix.matrix_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_colliding_ids_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save_job(&job(Some("backend-role"), "First")).await.unwrap();
        let err = store.save_job(&job(Some("Backend Role"), "Second")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.load_job("backend-role").await.unwrap().title, "First");

        // The canonical id still replaces the stored job.
        store.save_job(&job(Some("backend-role"), "Third")).await.unwrap();
        assert_eq!(store.load_job("backend-role").await.unwrap().title, "Third");

        store.save_cv("jane-doe", "# Jane").await.unwrap();
        assert!(matches!(
            store.save_cv("Jane Doe", "# Other").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unusable_identifier_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.save_cv("!!!", "x").await, Err(AppError::Validation(_))));
    }
}
