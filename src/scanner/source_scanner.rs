use crate::config::SourceConfig;
use crate::error::{BackupError, Result};
use crate::scanner::path_filter::PathFilter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        Self {
            source_path,
            relative_path,
            size,
            modified,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }

    /// First path component, i.e. the configured source directory (or the
    /// file name itself for top-level files).
    pub fn top_level(&self) -> String {
        self.relative_path
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Enumerates the configured knowledge-base directories and explicit files
/// under a project root, applying the exclusion rules.
pub struct SourceScanner {
    filter: PathFilter,
    directories: Vec<String>,
    files: Vec<String>,
    max_depth: usize,
}

impl SourceScanner {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            filter: PathFilter::new(config),
            directories: config.directories.clone(),
            files: config.files.clone(),
            max_depth: config.max_depth,
        }
    }

    /// Scan all configured sources under `root`. Missing source directories
    /// and permission errors are collected, not fatal; an entirely empty
    /// result is.
    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<Vec<SourceFile>> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            return Err(BackupError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut sources = Vec::new();
        let mut scan_errors = Vec::new();

        for dir_name in &self.directories {
            let dir_path = root_path.join(dir_name);
            if !dir_path.is_dir() {
                continue;
            }
            self.scan_directory(root_path, &dir_path, &mut sources, &mut scan_errors);
        }

        for file_name in &self.files {
            let file_path = root_path.join(file_name);
            if !file_path.is_file() {
                continue;
            }
            match file_path.metadata() {
                Ok(metadata) => sources.push(SourceFile::new(
                    file_path,
                    PathBuf::from(file_name),
                    metadata.len(),
                    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                )),
                Err(err) => scan_errors.push(format!("{}: {}", file_path.display(), err)),
            }
        }

        if sources.is_empty() {
            if !scan_errors.is_empty() {
                return Err(BackupError::Permission {
                    path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
                });
            }
            let mut searched: Vec<String> = self.directories.clone();
            searched.extend(self.files.clone());
            return Err(BackupError::SourcesMissing { searched });
        }

        // Sort by relative path for deterministic archive layout
        sources.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(sources)
    }

    fn scan_directory(
        &self,
        root_path: &Path,
        dir_path: &Path,
        sources: &mut Vec<SourceFile>,
        scan_errors: &mut Vec<String>,
    ) {
        let walker = WalkDir::new(dir_path)
            .max_depth(self.max_depth)
            .follow_links(false) // Security: don't follow symlinks
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = match entry.path().strip_prefix(root_path) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };

            if self.filter.is_excluded_file(&relative_path) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => sources.push(SourceFile::new(
                    entry.path().to_path_buf(),
                    relative_path,
                    metadata.len(),
                    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                )),
                Err(err) => {
                    scan_errors.push(format!("Error reading {}: {}", entry.path().display(), err))
                }
            }
        }
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.file_type().is_file() || entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        false
    }

    /// True when the primary (first-listed) data directory exists under root.
    pub fn primary_directory_present<P: AsRef<Path>>(&self, root: P) -> bool {
        match self.directories.first() {
            Some(dir) => root.as_ref().join(dir).is_dir(),
            None => true,
        }
    }

    pub fn primary_directory(&self) -> Option<&str> {
        self.directories.first().map(|s| s.as_str())
    }

    pub fn get_statistics(&self, sources: &[SourceFile]) -> ScanStatistics {
        let total_bytes = sources.iter().map(|s| s.size).sum();
        let mut top_level: Vec<String> = sources.iter().map(|s| s.top_level()).collect();
        top_level.sort();
        top_level.dedup();

        ScanStatistics {
            total_files: sources.len(),
            total_bytes,
            top_level_paths: top_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_bytes: u64,
    pub top_level_paths: Vec<String>,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        format!(
            "Scanned {} files ({} bytes) across: {}",
            self.total_files,
            self.total_bytes,
            self.top_level_paths.join(", ")
        )
    }
}
