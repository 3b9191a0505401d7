use std::fmt;
use std::path::{Path, PathBuf};

/// Lifecycle of a subtitle generation job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// Port for tracking the externally visible state of a job.
///
/// The pipeline drives status transitions through this trait so callers can
/// persist them wherever they need (database row, task queue entry, plain
/// memory). Implementations decide what to do with each update.
pub trait JobRecord: Send {
    fn set_status(&mut self, status: JobStatus);
    fn set_error_message(&mut self, message: &str);
    fn set_artifact(&mut self, path: &Path);
    fn clear_artifact(&mut self);
}

/// Job record held in memory, suitable for one-shot runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryJobRecord {
    status: JobStatus,
    error_message: Option<String>,
    artifact: Option<PathBuf>,
    history: Vec<JobStatus>,
}

impl InMemoryJobRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    /// Every status the record has been moved through, in order.
    pub fn history(&self) -> &[JobStatus] {
        &self.history
    }
}

impl JobRecord for InMemoryJobRecord {
    fn set_status(&mut self, status: JobStatus) {
        self.status = status;
        self.history.push(status);
    }

    fn set_error_message(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    fn set_artifact(&mut self, path: &Path) {
        self.artifact = Some(path.to_path_buf());
    }

    fn clear_artifact(&mut self) {
        self.artifact = None;
    }
}
