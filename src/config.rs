use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sources: SourceConfig,
    pub backup: BackupConfig,
    pub retention: RetentionConfig,
    pub restore: RestoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub directories: Vec<String>,
    pub files: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    pub days: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreConfig {
    pub expected_files: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourceConfig::default(),
            backup: BackupConfig::default(),
            retention: RetentionConfig::default(),
            restore: RestoreConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directories: vec![
                "knowledge_base".to_string(),
                "docs".to_string(),
                "templates".to_string(),
            ],
            files: vec!["README.md".to_string(), "CONTRIBUTING.md".to_string()],
            exclude_dirs: vec![
                ".git".to_string(),
                ".cache".to_string(),
                "__pycache__".to_string(),
                "node_modules".to_string(),
                "tmp".to_string(),
            ],
            exclude_patterns: vec![
                r".*\.tmp$".to_string(),
                r".*\.log$".to_string(),
                r".*\.swp$".to_string(),
                r"\.DS_Store$".to_string(),
            ],
            max_depth: 16,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./backups"),
            prefix: "automata_backup".to_string(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { days: 30 }
    }
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            expected_files: vec!["README.md".to_string(), "CONTRIBUTING.md".to_string()],
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BackupError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BackupError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| BackupError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                // Try to load from default locations
                let default_paths = ["automata-backup.toml", ".automata-backup.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                // If no config file found, use defaults
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref backup_dir) = cli_args.backup_dir {
            self.backup.directory = backup_dir.clone();
        }

        if let Some(retention_days) = cli_args.retention_days {
            self.retention.days = retention_days;
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.sources.exclude_dirs.extend(exclude.clone());
        }

        if let Some(ref prefix) = cli_args.prefix {
            self.backup.prefix = prefix.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| BackupError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| BackupError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.directories.is_empty() && self.sources.files.is_empty() {
            return Err(BackupError::Config {
                message: "At least one source directory or file must be specified".to_string(),
            });
        }

        if self.retention.days == 0 {
            return Err(BackupError::Config {
                message: "Retention period must be greater than 0 days".to_string(),
            });
        }

        if self.backup.prefix.is_empty() {
            return Err(BackupError::Config {
                message: "Backup prefix must not be empty".to_string(),
            });
        }

        if self.backup.prefix.contains('/') || self.backup.prefix.contains('\\') {
            return Err(BackupError::Config {
                message: "Backup prefix must not contain path separators".to_string(),
            });
        }

        if self.sources.max_depth == 0 {
            return Err(BackupError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.sources.exclude_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(BackupError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                });
            }
        }

        Ok(())
    }

    /// File name stem for an archive created at the given timestamp.
    pub fn archive_stem(&self, timestamp: &str) -> String {
        format!("{}_{}", self.backup.prefix, timestamp)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub backup_dir: Option<PathBuf>,
    pub retention_days: Option<u32>,
    pub exclude: Option<Vec<String>>,
    pub prefix: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backup_dir(mut self, backup_dir: Option<PathBuf>) -> Self {
        self.backup_dir = backup_dir;
        self
    }

    pub fn with_retention_days(mut self, days: Option<u32>) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }
}
