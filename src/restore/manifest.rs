use crate::error::Result;
use crate::restore::snapshot::Snapshot;
use crate::restore::validate::ValidationSummary;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `.restoration_manifest_<timestamp>` under the target directory,
/// summarizing what the restore found present or absent and how to roll back
/// manually when a pre-restore snapshot was taken.
pub fn write_restoration_manifest(
    target: &Path,
    archive_path: &Path,
    restored_at: DateTime<Utc>,
    timestamp: &str,
    extracted_count: usize,
    validation: &ValidationSummary,
    snapshot: Option<&Snapshot>,
) -> Result<PathBuf> {
    let manifest_path = target.join(format!(".restoration_manifest_{}", timestamp));
    let mut file = fs::File::create(&manifest_path)?;

    writeln!(file, "Automata Knowledge Base Restoration Manifest")?;
    writeln!(file, "============================================")?;
    writeln!(file)?;
    writeln!(file, "Archive: {}", archive_path.display())?;
    writeln!(file, "Target: {}", target.display())?;
    writeln!(
        file,
        "Restored: {}",
        restored_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "Entries extracted: {}", extracted_count)?;
    writeln!(file)?;

    writeln!(file, "Directories:")?;
    for dir in &validation.directories {
        match dir.file_count {
            Some(count) => writeln!(file, "  {}: {} files", dir.name, count)?,
            None => writeln!(file, "  {}: ABSENT", dir.name)?,
        }
    }
    writeln!(file)?;

    writeln!(file, "Expected files:")?;
    for expected in &validation.expected_files {
        let status = if expected.present { "present" } else { "MISSING" };
        writeln!(file, "  {}: {}", expected.name, status)?;
    }
    writeln!(file)?;

    match snapshot {
        Some(snapshot) => {
            writeln!(file, "Pre-restore snapshot: {}", snapshot.path.display())?;
            writeln!(
                file,
                "  Covers: {} ({} files)",
                snapshot.directories.join(", "),
                snapshot.files_copied
            )?;
            writeln!(file, "  To roll back this restore manually:")?;
            writeln!(
                file,
                "    cp -r {}/* {}/",
                snapshot.path.display(),
                target.display()
            )?;
        }
        None => {
            writeln!(
                file,
                "Pre-restore snapshot: none (target had no known subdirectories)"
            )?;
        }
    }

    Ok(manifest_path)
}
