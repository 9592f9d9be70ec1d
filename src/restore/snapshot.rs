use crate::error::{BackupError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A pre-restore copy of target data that a restore would otherwise
/// overwrite. Not integrity-checked; applying it back is a manual operation
/// described in the restoration manifest.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub directories: Vec<String>,
    pub files_copied: usize,
    pub warnings: Vec<String>,
}

/// Copy every known subdirectory that already exists under `target` into
/// `<target>/.pre_restore_backup_<timestamp>`. Returns `None` when the target
/// holds none of them and there is nothing to protect.
pub fn snapshot_existing(
    target: &Path,
    known_dirs: &[String],
    timestamp: &str,
) -> Result<Option<Snapshot>> {
    let present: Vec<&String> = known_dirs
        .iter()
        .filter(|dir| target.join(dir.as_str()).is_dir())
        .collect();

    if present.is_empty() {
        return Ok(None);
    }

    let snapshot_root = target.join(format!(".pre_restore_backup_{}", timestamp));
    fs::create_dir_all(&snapshot_root).map_err(|e| BackupError::Io(e))?;

    let mut files_copied = 0;
    let mut warnings = Vec::new();

    for dir in &present {
        let source_dir = target.join(dir.as_str());

        for entry in WalkDir::new(&source_dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warnings.push(format!("Skipped during snapshot: {}", err));
                    continue;
                }
            };

            let relative = match entry.path().strip_prefix(target) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let destination = snapshot_root.join(relative);

            let result = if entry.file_type().is_dir() {
                fs::create_dir_all(&destination)
            } else {
                fs::copy(entry.path(), &destination).map(|_| ())
            };

            match result {
                Ok(()) => {
                    if entry.file_type().is_file() {
                        files_copied += 1;
                    }
                }
                Err(err) => warnings.push(format!(
                    "Failed to copy {} into snapshot: {}",
                    entry.path().display(),
                    err
                )),
            }
        }
    }

    Ok(Some(Snapshot {
        path: snapshot_root,
        directories: present.into_iter().cloned().collect(),
        files_copied,
        warnings,
    }))
}
