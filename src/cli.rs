use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "archive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create a verified backup archive of the automata knowledge base")]
#[command(
    long_about = "Walks the configured knowledge-base directories and files, writes a \
                  timestamped compressed archive, verifies it, records a manifest, and \
                  deletes archives older than the retention window."
)]
#[command(after_help = "EXAMPLES:\n  \
    archive\n  \
    archive /var/backups/kb\n  \
    archive ./backups 14 --verbose\n  \
    archive --config backup.toml --output-format json\n  \
    archive --dry-run")]
pub struct ArchiveCli {
    /// Destination directory for archives (defaults to ./backups)
    #[arg(value_name = "BACKUP_DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Retention window in days (defaults to 30)
    #[arg(value_name = "RETENTION_DAYS")]
    pub retention_days: Option<u32>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Extra directory names to exclude from the archive
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Archive file name prefix (defaults to automata_backup)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be archived without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

impl ArchiveCli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_backup_dir(self.backup_dir.clone())
            .with_retention_days(self.retention_days)
            .with_exclude(self.exclude.clone())
            .with_prefix(self.prefix.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "restore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Restore a knowledge-base backup archive into a target directory")]
#[command(
    long_about = "Verifies the archive's integrity, snapshots any pre-existing target \
                  data, extracts the archive over the target directory, validates the \
                  expected paths, and writes a restoration manifest."
)]
#[command(after_help = "EXAMPLES:\n  \
    restore backups/automata_backup_20260830_120000.tar.gz\n  \
    restore backups/automata_backup_20260830_120000.tar.gz /srv/kb\n  \
    restore old.tar.gz --output-format plain --quiet")]
#[command(arg_required_else_help = true)]
pub struct RestoreCli {
    /// Backup archive to restore
    #[arg(value_name = "BACKUP_FILE")]
    pub backup_file: PathBuf,

    /// Directory to restore into (defaults to the current directory)
    #[arg(value_name = "TARGET_DIR")]
    pub target_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl RestoreCli {
    pub fn load_config(&self) -> Result<Config> {
        let config = Config::load_with_defaults(self.config.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn target_dir(&self) -> PathBuf {
        self.target_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn backup_file(&self) -> &Path {
        &self.backup_file
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}
