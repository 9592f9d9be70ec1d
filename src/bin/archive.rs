use automata_backup::{
    ArchiveCli, Archiver, BackupError, OutputFormatter, OutputMode, SourceScanner,
};
use clap::Parser;
use std::process;

fn main() {
    let cli_args = ArchiveCli::parse();

    if cli_args.generate_config {
        let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
        match Archiver::generate_sample_config("automata-backup.toml") {
            Ok(()) => {
                formatter.success("Sample configuration written to automata-backup.toml");
                process::exit(0);
            }
            Err(error) => {
                formatter.print_user_friendly_error(&error);
                process::exit(exit_code(&error));
            }
        }
    }

    let archiver = match Archiver::from_cli(&cli_args) {
        Ok(archiver) => archiver,
        Err(error) => {
            let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
            formatter.print_user_friendly_error(&error);
            process::exit(exit_code(&error));
        }
    };

    if cli_args.dry_run {
        process::exit(run_dry(&archiver));
    }

    match archiver.run() {
        Ok(report) => {
            archiver.output_formatter().print_archive_report(&report);
            process::exit(0);
        }
        Err(error) => {
            archiver.handle_error(&error);
            process::exit(exit_code(&error));
        }
    }
}

/// Scan and report what a real run would archive, without touching the
/// filesystem beyond reading it.
fn run_dry(archiver: &Archiver) -> i32 {
    let formatter = archiver.output_formatter();
    formatter.print_header("Dry run");

    let root = match std::env::current_dir() {
        Ok(root) => root,
        Err(error) => {
            let error = BackupError::Io(error);
            archiver.handle_error(&error);
            return exit_code(&error);
        }
    };

    let scanner = SourceScanner::new(&archiver.config().sources);
    match scanner.scan(&root) {
        Ok(sources) => {
            let stats = scanner.get_statistics(&sources);
            formatter.info(&stats.display_summary());
            for source in &sources {
                formatter.debug(&source.display_path());
            }
            formatter.success("Dry run complete; no archive written");
            0
        }
        Err(error) => {
            archiver.handle_error(&error);
            exit_code(&error)
        }
    }
}

fn exit_code(error: &BackupError) -> i32 {
    match error {
        BackupError::Config { .. } => 2,
        BackupError::ArchiveNotFound { .. } | BackupError::SourcesMissing { .. } => 3,
        BackupError::IntegrityCheck { .. } => 4,
        BackupError::ArchiveCreation { .. } => 5,
        BackupError::Extraction { .. } => 6,
        BackupError::Permission { .. } => 7,
        BackupError::BackupDirUnavailable { .. } => 8,
        _ => 1,
    }
}
