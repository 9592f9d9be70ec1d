use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a retention sweep: what was removed and what could not be.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub removed_archives: Vec<PathBuf>,
    pub removed_manifests: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl SweepOutcome {
    pub fn removed_count(&self) -> usize {
        self.removed_archives.len()
    }
}

/// Deletes archives strictly older than the retention window, by file
/// modification time, along with their manifest sidecars. Staged `.partial`
/// files and anything not matching `<prefix>_*.tar.gz` are left alone.
pub struct RetentionSweep {
    prefix: String,
    days: u32,
}

impl RetentionSweep {
    pub fn new<S: Into<String>>(prefix: S, days: u32) -> Self {
        Self {
            prefix: prefix.into(),
            days,
        }
    }

    pub fn sweep(&self, backup_dir: &Path, now: DateTime<Utc>) -> Result<SweepOutcome> {
        let mut outcome = SweepOutcome::default();
        let cutoff = now - Duration::days(i64::from(self.days));

        for entry in fs::read_dir(backup_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    outcome.warnings.push(format!("Unreadable entry: {}", err));
                    continue;
                }
            };

            let path = entry.path();
            if !self.is_managed_archive(&path) {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => DateTime::<Utc>::from(modified),
                Err(err) => {
                    outcome.warnings.push(format!(
                        "Cannot read modification time of {}: {}",
                        path.display(),
                        err
                    ));
                    continue;
                }
            };

            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => outcome.removed_archives.push(path.clone()),
                Err(err) => {
                    outcome
                        .warnings
                        .push(format!("Failed to delete {}: {}", path.display(), err));
                    continue;
                }
            }

            // Paired manifest goes with its archive
            let manifest_path = manifest_sibling(&path);
            if manifest_path.exists() {
                match fs::remove_file(&manifest_path) {
                    Ok(()) => outcome.removed_manifests.push(manifest_path),
                    Err(err) => outcome.warnings.push(format!(
                        "Failed to delete manifest {}: {}",
                        manifest_path.display(),
                        err
                    )),
                }
            }
        }

        Ok(outcome)
    }

    fn is_managed_archive(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        path.is_file()
            && name.starts_with(&format!("{}_", self.prefix))
            && name.ends_with(".tar.gz")
    }
}

/// `<dir>/<stem>.manifest` for an archive named `<dir>/<stem>.tar.gz`.
pub fn manifest_sibling(archive_path: &Path) -> PathBuf {
    let name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = name.strip_suffix(".tar.gz").unwrap_or(name);
    archive_path.with_file_name(format!("{}.manifest", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"archive bytes").unwrap();
        path
    }

    #[test]
    fn test_old_archives_and_manifests_are_removed() {
        let temp = TempDir::new().unwrap();
        let old_archive = touch(temp.path(), "automata_backup_20200101_000000.tar.gz");
        let old_manifest = touch(temp.path(), "automata_backup_20200101_000000.manifest");
        let fresh_archive = touch(temp.path(), "automata_backup_20990101_000000.tar.gz");

        // Sweep far in the future relative to the files' mtimes
        let sweep = RetentionSweep::new("automata_backup", 30);
        let now = Utc::now() + Duration::days(365);
        let outcome = sweep.sweep(temp.path(), now).unwrap();

        assert!(!old_archive.exists());
        assert!(!old_manifest.exists());
        assert!(!fresh_archive.exists()); // also older than the cutoff mtime-wise
        assert_eq!(outcome.removed_count(), 2);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_fresh_archives_are_retained() {
        let temp = TempDir::new().unwrap();
        let archive = touch(temp.path(), "automata_backup_20260830_120000.tar.gz");

        let sweep = RetentionSweep::new("automata_backup", 30);
        let outcome = sweep.sweep(temp.path(), Utc::now()).unwrap();

        assert!(archive.exists());
        assert_eq!(outcome.removed_count(), 0);
    }

    #[test]
    fn test_unmanaged_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let other = touch(temp.path(), "unrelated.tar.gz");
        let partial = touch(temp.path(), ".automata_backup_20200101_000000.tar.gz.partial");

        let sweep = RetentionSweep::new("automata_backup", 30);
        let now = Utc::now() + Duration::days(365);
        let outcome = sweep.sweep(temp.path(), now).unwrap();

        assert!(other.exists());
        assert!(partial.exists());
        assert_eq!(outcome.removed_count(), 0);
    }

    #[test]
    fn test_manifest_sibling_naming() {
        let sibling = manifest_sibling(Path::new("backups/automata_backup_20260830_120000.tar.gz"));
        assert_eq!(
            sibling,
            PathBuf::from("backups/automata_backup_20260830_120000.manifest")
        );
    }

    #[test]
    fn test_missing_backup_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let sweep = RetentionSweep::new("automata_backup", 30);
        let result = sweep.sweep(&temp.path().join("absent"), Utc::now());
        assert!(result.is_err());
    }
}
