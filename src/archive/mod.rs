pub mod manifest;
pub mod retention;
pub mod verify;
pub mod writer;

pub use manifest::write_archive_manifest;
pub use retention::{manifest_sibling, RetentionSweep, SweepOutcome};
pub use verify::{inspect_archive, verify_archive, ArchiveInventory};
pub use writer::ArchiveWriter;

use crate::config::Config;
use crate::pipeline::StepWarning;
use crate::scanner::SourceFile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timestamp format used in archive and snapshot names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Mutable state threaded through the archiver pipeline.
pub struct ArchiveContext {
    pub root: PathBuf,
    pub backup_dir: PathBuf,
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
    pub staging_path: PathBuf,
    pub archive_path: PathBuf,
    pub sources: Vec<SourceFile>,
    pub size_bytes: u64,
    pub inventory: Option<ArchiveInventory>,
    pub manifest_path: Option<PathBuf>,
    pub sweep: Option<SweepOutcome>,
}

impl ArchiveContext {
    pub fn new(root: &Path, config: &Config, created_at: DateTime<Utc>) -> Self {
        let timestamp = created_at.format(TIMESTAMP_FORMAT).to_string();
        let stem = config.archive_stem(&timestamp);
        let backup_dir = if config.backup.directory.is_absolute() {
            config.backup.directory.clone()
        } else {
            root.join(&config.backup.directory)
        };

        // Staged name is hidden and suffixed so sweeps and listings skip it
        let staging_path = backup_dir.join(format!(".{}.tar.gz.partial", stem));
        let archive_path = backup_dir.join(format!("{}.tar.gz", stem));

        Self {
            root: root.to_path_buf(),
            backup_dir,
            timestamp,
            created_at,
            staging_path,
            archive_path,
            sources: Vec::new(),
            size_bytes: 0,
            inventory: None,
            manifest_path: None,
            sweep: None,
        }
    }
}

/// Final report of an archiver run, rendered human-readable or as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub archive_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub size_bytes: u64,
    pub member_count: usize,
    pub top_level_paths: Vec<String>,
    pub removed_archives: Vec<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub duration: Duration,
    pub warnings: Vec<StepWarning>,
}

impl ArchiveReport {
    pub fn from_context(
        context: &ArchiveContext,
        warnings: Vec<StepWarning>,
        duration: Duration,
    ) -> Self {
        let (member_count, top_level_paths) = match &context.inventory {
            Some(inventory) => (inventory.member_count, inventory.top_level_paths()),
            None => (0, Vec::new()),
        };

        Self {
            archive_path: context.archive_path.clone(),
            manifest_path: context.manifest_path.clone(),
            size_bytes: context.size_bytes,
            member_count,
            top_level_paths,
            removed_archives: context
                .sweep
                .as_ref()
                .map(|s| s.removed_archives.clone())
                .unwrap_or_default(),
            created_at: context.created_at,
            duration,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let config = Config::default();
        let created_at = DateTime::parse_from_rfc3339("2026-08-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let context = ArchiveContext::new(Path::new("/project"), &config, created_at);

        assert_eq!(context.timestamp, "20260830_120000");
        assert_eq!(
            context.archive_path,
            PathBuf::from("/project/backups/automata_backup_20260830_120000.tar.gz")
        );
        assert_eq!(
            context.staging_path,
            PathBuf::from("/project/backups/.automata_backup_20260830_120000.tar.gz.partial")
        );
    }

    #[test]
    fn test_absolute_backup_dir_is_kept() {
        let mut config = Config::default();
        config.backup.directory = PathBuf::from("/var/backups/kb");

        let context = ArchiveContext::new(Path::new("/project"), &config, Utc::now());
        assert!(context.archive_path.starts_with("/var/backups/kb"));
    }

    #[test]
    fn test_report_from_empty_context() {
        let config = Config::default();
        let context = ArchiveContext::new(Path::new("/project"), &config, Utc::now());
        let report = ArchiveReport::from_context(&context, Vec::new(), Duration::from_secs(1));

        assert_eq!(report.member_count, 0);
        assert!(report.removed_archives.is_empty());
        assert!(report.warnings.is_empty());
    }
}
