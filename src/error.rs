use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup directory unavailable: {path}")]
    BackupDirUnavailable { path: String, message: String },

    #[error("Archive file not found: {path}")]
    ArchiveNotFound { path: String },

    #[error("No source paths found to archive")]
    SourcesMissing { searched: Vec<String> },

    #[error("Archive integrity check failed: {path}")]
    IntegrityCheck { path: String, message: String },

    #[error("Archive creation failed: {message}")]
    ArchiveCreation { message: String },

    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for BackupError {
    fn user_message(&self) -> String {
        match self {
            BackupError::BackupDirUnavailable { path, message } => {
                format!("Backup directory unavailable: {} ({})", path, message)
            }
            BackupError::ArchiveNotFound { path } => {
                format!("Archive file not found: {}", path)
            }
            BackupError::SourcesMissing { searched } => {
                format!(
                    "No source paths found to archive (looked for: {})",
                    searched.join(", ")
                )
            }
            BackupError::IntegrityCheck { path, message } => {
                format!("Archive failed its integrity check: {} ({})", path, message)
            }
            BackupError::ArchiveCreation { message } => {
                format!("Archive creation failed: {}", message)
            }
            BackupError::Extraction { message } => {
                format!("Extraction failed: {}", message)
            }
            BackupError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            BackupError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            BackupError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            BackupError::BackupDirUnavailable { .. } => Some(
                "Check that the backup directory's parent exists and is writable, or pass a different destination as the first argument.".to_string()
            ),
            BackupError::ArchiveNotFound { .. } => Some(
                "Verify the archive path. Archives are normally stored under the backup directory as <prefix>_<timestamp>.tar.gz.".to_string()
            ),
            BackupError::SourcesMissing { .. } => Some(
                "Run from the project root, or list the knowledge-base directories and files under [sources] in the configuration file.".to_string()
            ),
            BackupError::IntegrityCheck { .. } => Some(
                "The archive is corrupt or truncated and cannot be used. Pick an older archive from the backup directory.".to_string()
            ),
            BackupError::Extraction { .. } => Some(
                "The target directory may be partially overwritten. If a .pre_restore_backup_<timestamp> directory exists, copy its contents back to roll back.".to_string()
            ),
            BackupError::Config { .. } => Some(
                "Check the configuration file syntax. Run archive --generate-config to produce a sample file.".to_string()
            ),
            BackupError::Permission { .. } => Some(
                "Ensure you have read permission on the sources and write permission on the destination.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for BackupError {
    fn from(error: toml::de::Error) -> Self {
        BackupError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = BackupError::ArchiveNotFound {
            path: "backups/missing.tar.gz".to_string(),
        };
        assert!(error.user_message().contains("not found"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_integrity_error_message() {
        let error = BackupError::IntegrityCheck {
            path: "backups/bad.tar.gz".to_string(),
            message: "unexpected EOF".to_string(),
        };
        assert!(error.user_message().contains("integrity"));
        assert!(error.user_message().contains("unexpected EOF"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = BackupError::from(io_error);
        assert!(matches!(error, BackupError::Io(_)));
        assert!(error.suggestion().is_none());
    }
}
