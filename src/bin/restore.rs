use automata_backup::{BackupError, OutputFormatter, OutputMode, RestoreCli, Restorer};
use clap::Parser;
use std::process;

fn main() {
    let cli_args = RestoreCli::parse();

    let restorer = match Restorer::from_cli(&cli_args) {
        Ok(restorer) => restorer,
        Err(error) => {
            let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
            formatter.print_user_friendly_error(&error);
            process::exit(exit_code(&error));
        }
    };

    let target = cli_args.target_dir();
    match restorer.run(cli_args.backup_file(), &target) {
        Ok(report) => {
            restorer.output_formatter().print_restore_report(&report);
            process::exit(0);
        }
        Err(error) => {
            restorer.handle_error(&error);
            process::exit(exit_code(&error));
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
