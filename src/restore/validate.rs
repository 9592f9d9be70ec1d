use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Presence-and-count validation of a restored target. Counts files in known
/// subdirectories and checks the expected top-level files exist; no
/// checksumming or content diffing.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub directories: Vec<DirectoryStatus>,
    pub expected_files: Vec<FileStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStatus {
    pub name: String,
    /// File count when the directory exists, `None` when it is absent.
    pub file_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileStatus {
    pub name: String,
    pub present: bool,
}

impl ValidationSummary {
    pub fn all_expected_present(&self) -> bool {
        self.expected_files.iter().all(|f| f.present)
    }

    pub fn missing(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .directories
            .iter()
            .filter(|d| d.file_count.is_none())
            .map(|d| d.name.clone())
            .collect();
        missing.extend(
            self.expected_files
                .iter()
                .filter(|f| !f.present)
                .map(|f| f.name.clone()),
        );
        missing
    }
}

pub fn validate_restore(
    target: &Path,
    known_dirs: &[String],
    expected_files: &[String],
) -> ValidationSummary {
    let directories = known_dirs
        .iter()
        .map(|name| {
            let dir_path = target.join(name);
            let file_count = if dir_path.is_dir() {
                Some(count_files(&dir_path))
            } else {
                None
            };
            DirectoryStatus {
                name: name.clone(),
                file_count,
            }
        })
        .collect();

    let expected_files = expected_files
        .iter()
        .map(|name| FileStatus {
            name: name.clone(),
            present: target.join(name).is_file(),
        })
        .collect();

    ValidationSummary {
        directories,
        expected_files,
    }
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    #[test]
    fn test_validation_counts_and_presence() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "knowledge_base/a.md");
        write_file(temp.path(), "knowledge_base/sub/b.md");
        write_file(temp.path(), "README.md");

        let summary = validate_restore(
            temp.path(),
            &["knowledge_base".to_string(), "docs".to_string()],
            &["README.md".to_string(), "CONTRIBUTING.md".to_string()],
        );

        assert_eq!(summary.directories[0].file_count, Some(2));
        assert_eq!(summary.directories[1].file_count, None);
        assert!(summary.expected_files[0].present);
        assert!(!summary.expected_files[1].present);
        assert!(!summary.all_expected_present());
        assert_eq!(summary.missing(), vec!["docs", "CONTRIBUTING.md"]);
    }

    #[test]
    fn test_validation_all_present() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "knowledge_base/a.md");
        write_file(temp.path(), "README.md");

        let summary = validate_restore(
            temp.path(),
            &["knowledge_base".to_string()],
            &["README.md".to_string()],
        );

        assert!(summary.all_expected_present());
        assert!(summary.missing().is_empty());
    }
}
