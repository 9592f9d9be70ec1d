pub mod extract;
pub mod manifest;
pub mod snapshot;
pub mod validate;

pub use extract::extract_archive;
pub use manifest::write_restoration_manifest;
pub use snapshot::{snapshot_existing, Snapshot};
pub use validate::{validate_restore, DirectoryStatus, FileStatus, ValidationSummary};

use crate::archive::TIMESTAMP_FORMAT;
use crate::pipeline::StepWarning;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mutable state threaded through the restorer pipeline.
pub struct RestoreContext {
    pub archive_path: PathBuf,
    pub target: PathBuf,
    pub timestamp: String,
    pub restored_at: DateTime<Utc>,
    pub member_count: usize,
    pub snapshot: Option<Snapshot>,
    pub extracted_count: usize,
    pub validation: Option<ValidationSummary>,
    pub manifest_path: Option<PathBuf>,
}

impl RestoreContext {
    pub fn new(archive_path: &Path, target: &Path, restored_at: DateTime<Utc>) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            target: target.to_path_buf(),
            timestamp: restored_at.format(TIMESTAMP_FORMAT).to_string(),
            restored_at,
            member_count: 0,
            snapshot: None,
            extracted_count: 0,
            validation: None,
            manifest_path: None,
        }
    }
}

/// Final report of a restorer run.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub archive_path: PathBuf,
    pub target: PathBuf,
    pub extracted_count: usize,
    pub snapshot_path: Option<PathBuf>,
    pub validation: Option<ValidationSummary>,
    pub manifest_path: Option<PathBuf>,
    pub restored_at: DateTime<Utc>,
    pub duration: Duration,
    pub warnings: Vec<StepWarning>,
}

impl RestoreReport {
    pub fn from_context(
        context: &RestoreContext,
        warnings: Vec<StepWarning>,
        duration: Duration,
    ) -> Self {
        Self {
            archive_path: context.archive_path.clone(),
            target: context.target.clone(),
            extracted_count: context.extracted_count,
            snapshot_path: context.snapshot.as_ref().map(|s| s.path.clone()),
            validation: context.validation.clone(),
            manifest_path: context.manifest_path.clone(),
            restored_at: context.restored_at,
            duration,
            warnings,
        }
    }
}
