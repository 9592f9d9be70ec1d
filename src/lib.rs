pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod restore;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{ArchiveCli, OutputFormat, RestoreCli};
pub use config::{BackupConfig, CliOverrides, Config, RetentionConfig, SourceConfig};
pub use error::{BackupError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{ArchiveInventory, ArchiveReport, ArchiveWriter, RetentionSweep};
pub use pipeline::{Pipeline, PipelineReport, Reporter, Step, StepOutcome, StepPolicy};
pub use restore::{RestoreReport, Snapshot, ValidationSummary};
pub use scanner::{SourceFile, SourceScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use archive::{
    inspect_archive, manifest_sibling, write_archive_manifest, ArchiveContext, RetentionSweep as Sweep,
};
use chrono::Utc;
use restore::{
    extract_archive, snapshot_existing, validate_restore, write_restoration_manifest,
    RestoreContext,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use ui::progress::finish_progress;

/// Orchestrates the archiver pipeline: prepare, scan, write, verify, publish,
/// manifest, retention.
pub struct Archiver {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Archiver {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an Archiver from CLI arguments
    pub fn from_cli(cli_args: &ArchiveCli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = output_mode_from_format(&cli_args.output_format);

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Run the full backup pipeline from the current directory.
    pub fn run(&self) -> Result<ArchiveReport> {
        let root = std::env::current_dir()?;
        self.run_from(&root)
    }

    /// Run the full backup pipeline with `root` as the project root.
    pub fn run_from(&self, root: &Path) -> Result<ArchiveReport> {
        let start_time = Instant::now();
        let mut context = ArchiveContext::new(root, &self.config, Utc::now());

        let scanner = SourceScanner::new(&self.config.sources);
        let writer = ArchiveWriter::new();

        let pipeline = Pipeline::new(vec![
            Step::must_succeed("Preparing backup directory", |ctx: &mut ArchiveContext, _r| {
                fs::create_dir_all(&ctx.backup_dir).map_err(|e| {
                    BackupError::BackupDirUnavailable {
                        path: ctx.backup_dir.display().to_string(),
                        message: e.to_string(),
                    }
                })?;

                if !scanner.primary_directory_present(&ctx.root) {
                    let dir = scanner.primary_directory().unwrap_or("knowledge_base");
                    return Ok(StepOutcome::Warning(format!(
                        "Primary data directory '{}' not found under {}",
                        dir,
                        ctx.root.display()
                    )));
                }
                Ok(StepOutcome::Success)
            }),
            Step::must_succeed("Scanning sources", |ctx: &mut ArchiveContext, r| {
                ctx.sources = scanner.scan(&ctx.root)?;
                let stats = scanner.get_statistics(&ctx.sources);
                r.info(&stats.display_summary());
                Ok(StepOutcome::Success)
            }),
            Step::must_succeed("Writing archive", |ctx: &mut ArchiveContext, _r| {
                let pb = self
                    .progress_manager
                    .create_file_progress(ctx.sources.len() as u64);

                let result = writer.write(&ctx.sources, &ctx.staging_path, |source| {
                    pb.set_message(source.display_path());
                    pb.inc(1);
                });

                match result {
                    Ok(size) => {
                        ctx.size_bytes = size;
                        finish_progress(&pb, "archive written");
                        Ok(StepOutcome::Success)
                    }
                    Err(err) => {
                        pb.abandon_with_message("archive creation failed");
                        discard_staged(&ctx.staging_path);
                        Err(err)
                    }
                }
            }),
            self.verify_step(),
            self.publish_step(),
            self.manifest_step(),
            Step::best_effort("Applying retention policy", |ctx: &mut ArchiveContext, r| {
                let sweep = Sweep::new(&self.config.backup.prefix, self.config.retention.days);
                let outcome = sweep.sweep(&ctx.backup_dir, Utc::now())?;

                if outcome.removed_count() > 0 {
                    r.info(&format!(
                        "Retention: removed {} archive(s) older than {} days",
                        outcome.removed_count(),
                        self.config.retention.days
                    ));
                }

                let warnings = outcome.warnings.clone();
                ctx.sweep = Some(outcome);

                if warnings.is_empty() {
                    Ok(StepOutcome::Success)
                } else {
                    Ok(StepOutcome::Warning(warnings.join("; ")))
                }
            }),
        ]);

        let pipeline_report = pipeline.run(&mut context, &self.output_formatter)?;

        Ok(ArchiveReport::from_context(
            &context,
            pipeline_report.warnings,
            start_time.elapsed(),
        ))
    }

    fn verify_step(&self) -> Step<'_, ArchiveContext> {
        Step::must_succeed(
            "Verifying archive integrity",
            move |ctx: &mut ArchiveContext, r| {
                let spinner = self
                    .progress_manager
                    .create_spinner("Reading archive entry table");

                match inspect_archive(&ctx.staging_path) {
                    Ok(inventory) => {
                        spinner.finish_and_clear();
                        r.info(&format!("Archive verified: {} members", inventory.member_count));
                        ctx.inventory = Some(inventory);
                        Ok(StepOutcome::Success)
                    }
                    Err(err) => {
                        spinner.abandon_with_message("verification failed");
                        discard_staged(&ctx.staging_path);
                        Err(err)
                    }
                }
            },
        )
    }

    fn publish_step(&self) -> Step<'_, ArchiveContext> {
        Step::must_succeed("Publishing archive", |ctx: &mut ArchiveContext, _r| {
            ArchiveWriter::new().publish(&ctx.staging_path, &ctx.archive_path)?;
            Ok(StepOutcome::Success)
        })
    }

    fn manifest_step(&self) -> Step<'_, ArchiveContext> {
        Step::best_effort("Writing manifest", |ctx: &mut ArchiveContext, _r| {
            let inventory = ctx
                .inventory
                .as_ref()
                .ok_or_else(|| BackupError::ArchiveCreation {
                    message: "archive inventory unavailable".to_string(),
                })?;
            ctx.manifest_path = Some(write_archive_manifest(
                &ctx.archive_path,
                ctx.created_at,
                ctx.size_bytes,
                inventory,
            )?);
            Ok(StepOutcome::Success)
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        fs::write(output_path.as_ref(), sample_config).map_err(BackupError::Io)?;
        Ok(())
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &BackupError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Orchestrates the restorer pipeline: validate input, verify, snapshot,
/// extract, validate, manifest.
pub struct Restorer {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Restorer {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a Restorer from CLI arguments
    pub fn from_cli(cli_args: &RestoreCli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = output_mode_from_format(&cli_args.output_format);

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Restore `archive_path` into `target`.
    pub fn run(&self, archive_path: &Path, target: &Path) -> Result<RestoreReport> {
        let start_time = Instant::now();
        let mut context = RestoreContext::new(archive_path, target, Utc::now());

        let known_dirs = self.config.sources.directories.clone();
        let expected_files = self.config.restore.expected_files.clone();

        let pipeline = Pipeline::new(vec![
            Step::must_succeed("Validating arguments", |ctx: &mut RestoreContext, _r| {
                if !ctx.archive_path.is_file() {
                    return Err(BackupError::ArchiveNotFound {
                        path: ctx.archive_path.display().to_string(),
                    });
                }

                let manifest = manifest_sibling(&ctx.archive_path);
                if !manifest.exists() {
                    return Ok(StepOutcome::Warning(format!(
                        "No companion manifest found at {}",
                        manifest.display()
                    )));
                }
                Ok(StepOutcome::Success)
            }),
            Step::must_succeed("Verifying archive integrity", |ctx: &mut RestoreContext, r| {
                let spinner = self
                    .progress_manager
                    .create_spinner("Reading archive entry table");

                match inspect_archive(&ctx.archive_path) {
                    Ok(inventory) => {
                        spinner.finish_and_clear();
                        r.info(&format!("Archive verified: {} members", inventory.member_count));
                        ctx.member_count = inventory.member_count;
                        Ok(StepOutcome::Success)
                    }
                    Err(err) => {
                        spinner.abandon_with_message("verification failed");
                        Err(err)
                    }
                }
            }),
            Step::best_effort("Snapshotting existing data", |ctx: &mut RestoreContext, r| {
                match snapshot_existing(&ctx.target, &known_dirs, &ctx.timestamp)? {
                    Some(snapshot) => {
                        r.info(&format!(
                            "Saved pre-restore snapshot to {} ({} files)",
                            snapshot.path.display(),
                            snapshot.files_copied
                        ));
                        let warnings = snapshot.warnings.clone();
                        ctx.snapshot = Some(snapshot);
                        if warnings.is_empty() {
                            Ok(StepOutcome::Success)
                        } else {
                            Ok(StepOutcome::Warning(warnings.join("; ")))
                        }
                    }
                    None => {
                        r.info("Target has no existing knowledge-base data; skipping snapshot");
                        Ok(StepOutcome::Success)
                    }
                }
            }),
            Step::must_succeed("Extracting archive", |ctx: &mut RestoreContext, _r| {
                let pb = self
                    .progress_manager
                    .create_file_progress(ctx.member_count as u64);

                let result = extract_archive(&ctx.archive_path, &ctx.target, |entry| {
                    pb.set_message(entry.display().to_string());
                    pb.inc(1);
                });

                match result {
                    Ok(count) => {
                        ctx.extracted_count = count;
                        finish_progress(&pb, "extraction complete");
                        Ok(StepOutcome::Success)
                    }
                    Err(err) => {
                        pb.abandon_with_message("extraction failed");
                        Err(err)
                    }
                }
            }),
            Step::best_effort("Validating restored content", |ctx: &mut RestoreContext, _r| {
                let summary = validate_restore(&ctx.target, &known_dirs, &expected_files);
                let missing = summary.missing();
                ctx.validation = Some(summary);

                if missing.is_empty() {
                    Ok(StepOutcome::Success)
                } else {
                    Ok(StepOutcome::Warning(format!(
                        "Missing after restore: {}",
                        missing.join(", ")
                    )))
                }
            }),
            Step::best_effort("Writing restoration manifest", |ctx: &mut RestoreContext, _r| {
                let validation = ctx
                    .validation
                    .clone()
                    .unwrap_or_else(|| validate_restore(&ctx.target, &known_dirs, &expected_files));

                ctx.manifest_path = Some(write_restoration_manifest(
                    &ctx.target,
                    &ctx.archive_path,
                    ctx.restored_at,
                    &ctx.timestamp,
                    ctx.extracted_count,
                    &validation,
                    ctx.snapshot.as_ref(),
                )?);
                Ok(StepOutcome::Success)
            }),
        ]);

        let pipeline_report = pipeline.run(&mut context, &self.output_formatter)?;

        Ok(RestoreReport::from_context(
            &context,
            pipeline_report.warnings,
            start_time.elapsed(),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &BackupError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn output_mode_from_format(format: &OutputFormat) -> OutputMode {
    match format {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Json,
        OutputFormat::Plain => OutputMode::Plain,
    }
}

/// Best-effort removal of a failed staged archive; nothing beyond the failed
/// file itself is cleaned up.
fn discard_staged(staging_path: &PathBuf) {
    let _ = fs::remove_file(staging_path);
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RecordingReporter;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn seed_project(root: &Path) {
        write_file(root, "knowledge_base/topics/rust.md", "# rust");
        write_file(root, "knowledge_base/index.md", "index");
        write_file(root, "docs/guide.md", "guide");
        write_file(root, "README.md", "readme");
        write_file(root, "CONTRIBUTING.md", "contributing");
    }

    fn quiet_archiver(config: Config) -> Archiver {
        Archiver::new(config, OutputMode::Plain, 0, true)
    }

    fn quiet_restorer(config: Config) -> Restorer {
        Restorer::new(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_archiver_end_to_end() {
        let temp = TempDir::new().unwrap();
        seed_project(temp.path());

        let archiver = quiet_archiver(Config::default());
        let report = archiver.run_from(temp.path()).unwrap();

        assert!(report.archive_path.exists());
        assert!(report.manifest_path.as_ref().unwrap().exists());
        assert_eq!(report.member_count, 5);
        assert!(report.top_level_paths.contains(&"knowledge_base".to_string()));
        assert!(report.warnings.is_empty());

        // No staged leftovers
        let staged: Vec<_> = fs::read_dir(temp.path().join("backups"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_archiver_warns_when_primary_dir_missing() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "README.md", "readme");

        let archiver = quiet_archiver(Config::default());
        let report = archiver.run_from(temp.path()).unwrap();

        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("knowledge_base")));
    }

    #[test]
    fn test_archiver_fails_without_sources() {
        let temp = TempDir::new().unwrap();

        let archiver = quiet_archiver(Config::default());
        let result = archiver.run_from(temp.path());

        assert!(matches!(result, Err(BackupError::SourcesMissing { .. })));
        // The failed run must not leave a manifest behind
        let entries: Vec<_> = fs::read_dir(temp.path().join("backups"))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_corrupt_staged_archive_is_never_published() {
        let temp = TempDir::new().unwrap();
        let archiver = quiet_archiver(Config::default());

        let mut ctx = ArchiveContext::new(temp.path(), archiver.config(), Utc::now());
        fs::create_dir_all(&ctx.backup_dir).unwrap();
        fs::write(&ctx.staging_path, b"truncated garbage, not a gzip stream").unwrap();

        let pipeline = Pipeline::new(vec![
            archiver.verify_step(),
            archiver.publish_step(),
            archiver.manifest_step(),
        ]);
        let reporter = RecordingReporter::new();
        let result = pipeline.run(&mut ctx, &reporter);

        assert!(matches!(result, Err(BackupError::IntegrityCheck { .. })));
        // Failed verification removes the staged file and aborts before the
        // publish and manifest steps ever run
        assert!(!ctx.staging_path.exists());
        assert!(!ctx.archive_path.exists());
        assert!(!manifest_sibling(&ctx.archive_path).exists());
        assert!(ctx.manifest_path.is_none());
    }

    #[test]
    fn test_round_trip_restore() {
        let temp = TempDir::new().unwrap();
        seed_project(temp.path());

        let archiver = quiet_archiver(Config::default());
        let archive_report = archiver.run_from(temp.path()).unwrap();

        let target = TempDir::new().unwrap();
        let restorer = quiet_restorer(Config::default());
        let restore_report = restorer
            .run(&archive_report.archive_path, target.path())
            .unwrap();

        assert_eq!(restore_report.extracted_count, 5);
        assert!(target.path().join("knowledge_base/topics/rust.md").exists());
        assert!(target.path().join("README.md").exists());
        assert!(restore_report.snapshot_path.is_none());

        let validation = restore_report.validation.unwrap();
        assert!(validation.all_expected_present());
    }

    #[test]
    fn test_restore_snapshots_existing_data() {
        let temp = TempDir::new().unwrap();
        seed_project(temp.path());

        let archiver = quiet_archiver(Config::default());
        let archive_report = archiver.run_from(temp.path()).unwrap();

        let target = TempDir::new().unwrap();
        write_file(target.path(), "knowledge_base/old.md", "old content");

        let restorer = quiet_restorer(Config::default());
        let restore_report = restorer
            .run(&archive_report.archive_path, target.path())
            .unwrap();

        let snapshot_path = restore_report.snapshot_path.unwrap();
        assert!(snapshot_path.join("knowledge_base/old.md").exists());
        assert_eq!(
            fs::read_to_string(snapshot_path.join("knowledge_base/old.md")).unwrap(),
            "old content"
        );
    }

    #[test]
    fn test_restore_missing_archive_fails() {
        let temp = TempDir::new().unwrap();
        let restorer = quiet_restorer(Config::default());

        let result = restorer.run(&temp.path().join("absent.tar.gz"), temp.path());
        assert!(matches!(result, Err(BackupError::ArchiveNotFound { .. })));
    }

    #[test]
    fn test_restore_corrupt_archive_leaves_target_untouched() {
        let temp = TempDir::new().unwrap();
        let bad_archive = temp.path().join("automata_backup_20260830_120000.tar.gz");
        fs::write(&bad_archive, b"corrupt bytes").unwrap();

        let target = TempDir::new().unwrap();
        let restorer = quiet_restorer(Config::default());
        let result = restorer.run(&bad_archive, target.path());

        assert!(matches!(result, Err(BackupError::IntegrityCheck { .. })));
        let entries: Vec<_> = fs::read_dir(target.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_restore_warns_on_missing_manifest() {
        let temp = TempDir::new().unwrap();
        seed_project(temp.path());

        let archiver = quiet_archiver(Config::default());
        let archive_report = archiver.run_from(temp.path()).unwrap();
        fs::remove_file(archive_report.manifest_path.unwrap()).unwrap();

        let target = TempDir::new().unwrap();
        let restorer = quiet_restorer(Config::default());
        let report = restorer
            .run(&archive_report.archive_path, target.path())
            .unwrap();

        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("manifest")));
    }

    #[test]
    fn test_two_runs_produce_distinct_archives() {
        let temp = TempDir::new().unwrap();
        seed_project(temp.path());

        let archiver = quiet_archiver(Config::default());
        let first = archiver.run_from(temp.path()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let second = archiver.run_from(temp.path()).unwrap();

        assert_ne!(first.archive_path, second.archive_path);
        assert!(first.archive_path.exists());
        assert!(second.archive_path.exists());
        assert!(archive::verify_archive(&first.archive_path).is_ok());
        assert!(archive::verify_archive(&second.archive_path).is_ok());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("sample.toml");

        Archiver::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[sources]"));
        assert!(content.contains("[retention]"));
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
