use crate::error::{BackupError, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Member list and count obtained by reading an archive's full entry table.
#[derive(Debug, Clone)]
pub struct ArchiveInventory {
    pub member_count: usize,
    pub members: Vec<PathBuf>,
}

impl ArchiveInventory {
    /// First path component of every member, deduplicated and sorted.
    pub fn top_level_paths(&self) -> Vec<String> {
        let mut tops: Vec<String> = self
            .members
            .iter()
            .filter_map(|m| m.components().next())
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        tops.sort();
        tops.dedup();
        tops
    }
}

/// Walk the complete entry table of a gzip-compressed tarball, the equivalent
/// of `tar -t`. Any read or header error fails the check; an archive is never
/// considered valid for restore unless this passes.
pub fn inspect_archive(path: &Path) -> Result<ArchiveInventory> {
    let file = fs::File::open(path).map_err(|e| BackupError::IntegrityCheck {
        path: path.display().to_string(),
        message: format!("cannot open archive: {}", e),
    })?;

    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    let entries = archive.entries().map_err(|e| BackupError::IntegrityCheck {
        path: path.display().to_string(),
        message: format!("cannot read entry table: {}", e),
    })?;

    let mut members = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BackupError::IntegrityCheck {
            path: path.display().to_string(),
            message: format!("corrupt entry: {}", e),
        })?;

        let member_path = entry
            .header()
            .path()
            .map_err(|e| BackupError::IntegrityCheck {
                path: path.display().to_string(),
                message: format!("invalid path in archive entry: {}", e),
            })?
            .to_path_buf();

        members.push(member_path);
    }

    Ok(ArchiveInventory {
        member_count: members.len(),
        members,
    })
}

/// Integrity check alone, discarding the inventory.
pub fn verify_archive(path: &Path) -> Result<usize> {
    inspect_archive(path).map(|inventory| inventory.member_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tar::Builder;
    use tempfile::TempDir;

    fn build_archive(dir: &Path, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let file = fs::File::create(&path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (member, content) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, member, content.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
        path
    }

    #[test]
    fn test_inspect_valid_archive() {
        let temp = TempDir::new().unwrap();
        let path = build_archive(
            temp.path(),
            "valid.tar.gz",
            &[
                ("knowledge_base/a.md", "alpha"),
                ("knowledge_base/b.md", "beta"),
                ("docs/c.md", "gamma"),
            ],
        );

        let inventory = inspect_archive(&path).unwrap();
        assert_eq!(inventory.member_count, 3);
        assert_eq!(inventory.top_level_paths(), vec!["docs", "knowledge_base"]);
    }

    #[test]
    fn test_verify_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = verify_archive(&temp.path().join("absent.tar.gz"));
        assert!(matches!(result, Err(BackupError::IntegrityCheck { .. })));
    }

    #[test]
    fn test_verify_truncated_archive_fails() {
        let temp = TempDir::new().unwrap();
        let path = build_archive(
            temp.path(),
            "whole.tar.gz",
            &[("knowledge_base/a.md", "alpha")],
        );

        let bytes = fs::read(&path).unwrap();
        let truncated = temp.path().join("truncated.tar.gz");
        let mut file = fs::File::create(&truncated).unwrap();
        file.write_all(&bytes[..bytes.len() / 2]).unwrap();

        let result = verify_archive(&truncated);
        assert!(matches!(result, Err(BackupError::IntegrityCheck { .. })));
    }

    #[test]
    fn test_verify_garbage_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("garbage.tar.gz");
        fs::write(&path, b"this is not a gzip stream").unwrap();

        let result = verify_archive(&path);
        assert!(matches!(result, Err(BackupError::IntegrityCheck { .. })));
    }
}
