use crate::config::SourceConfig;
use regex::Regex;
use std::path::Path;

/// Exclusion rules applied while walking source trees: directory names that
/// are never descended into, and regex patterns matched against relative
/// paths.
pub struct PathFilter {
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl PathFilter {
    pub fn new(config: &SourceConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        }
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            if self
                .exclude_dirs
                .iter()
                .any(|exclude| exclude == dir_name)
            {
                return false;
            }

            let path_str = path.to_string_lossy();
            for pattern in &self.exclude_patterns {
                if pattern.is_match(&path_str) {
                    return false;
                }
            }
        }

        true
    }

    pub fn is_excluded_file(&self, relative_path: &Path) -> bool {
        let path_str = relative_path.to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(&path_str))
    }

    pub fn get_exclude_dirs(&self) -> &Vec<String> {
        &self.exclude_dirs
    }

    pub fn add_exclude_directory<S: Into<String>>(&mut self, directory: S) {
        let dir = directory.into();
        if !self.exclude_dirs.contains(&dir) {
            self.exclude_dirs.push(dir);
        }
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        let config = SourceConfig::default();
        Self::new(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> SourceConfig {
        SourceConfig {
            directories: vec!["knowledge_base".to_string()],
            files: vec![],
            exclude_dirs: vec![
                ".git".to_string(),
                ".cache".to_string(),
                "__pycache__".to_string(),
            ],
            exclude_patterns: vec![r".*\.tmp$".to_string(), r".*\.log$".to_string()],
            max_depth: 16,
        }
    }

    #[test]
    fn test_directory_traversal_rules() {
        let config = create_test_config();
        let filter = PathFilter::new(&config);

        assert!(filter.should_traverse_directory(Path::new("knowledge_base")));
        assert!(filter.should_traverse_directory(Path::new("docs")));

        assert!(!filter.should_traverse_directory(Path::new(".git")));
        assert!(!filter.should_traverse_directory(Path::new(".cache")));
        assert!(!filter.should_traverse_directory(Path::new("__pycache__")));
    }

    #[test]
    fn test_file_exclusion_patterns() {
        let config = create_test_config();
        let filter = PathFilter::new(&config);

        assert!(filter.is_excluded_file(Path::new("scratch/draft.tmp")));
        assert!(filter.is_excluded_file(Path::new("run.log")));
        assert!(!filter.is_excluded_file(Path::new("notes/design.md")));
    }

    #[test]
    fn test_invalid_patterns_are_skipped() {
        let mut config = create_test_config();
        config.exclude_patterns.push("[unclosed".to_string());

        // Construction must not panic; the broken pattern is dropped
        let filter = PathFilter::new(&config);
        assert!(filter.is_excluded_file(Path::new("a.tmp")));
    }

    #[test]
    fn test_filter_modification() {
        let config = create_test_config();
        let mut filter = PathFilter::new(&config);

        assert!(filter.should_traverse_directory(Path::new("vendor")));
        filter.add_exclude_directory("vendor");
        assert!(!filter.should_traverse_directory(Path::new("vendor")));
        assert_eq!(filter.get_exclude_dirs().len(), 4);
    }
}
