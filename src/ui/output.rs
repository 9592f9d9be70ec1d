use crate::archive::manifest::format_bytes;
use crate::archive::ArchiveReport;
use crate::error::{BackupError, UserFriendlyError};
use crate::pipeline::Reporter;
use crate::restore::RestoreReport;
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Warning, message),
            OutputMode::Json => self.print_json_message("warning", message),
            OutputMode::Plain => println!("WARNING: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Info, message),
            OutputMode::Json => self.print_json_message("info", message),
            OutputMode::Plain => println!("INFO: {}", message),
        }
    }

    pub fn debug(&self, message: &str) {
        if !self.should_show_message(2) {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("  {}", style(message).dim());
                } else {
                    println!("  DEBUG: {}", message);
                }
            }
            OutputMode::Json => self.print_json_message("debug", message),
            OutputMode::Plain => println!("DEBUG: {}", message),
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}{}", ROCKET, style(operation).bold());
                } else {
                    println!("> {}", operation);
                }
            }
            OutputMode::Json => self.print_json_message("operation_start", operation),
            OutputMode::Plain => println!("STARTING: {}", operation),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &BackupError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_archive_report(&self, report: &ArchiveReport) {
        match self.mode {
            OutputMode::Human => self.print_human_archive_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_archive_report(report),
        }
    }

    pub fn print_restore_report(&self, report: &RestoreReport) {
        match self.mode {
            OutputMode::Human => self.print_human_restore_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_restore_report(report),
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_archive_report(&self, report: &ArchiveReport) {
        if self.quiet {
            return;
        }

        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Backup completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Backup completed!");
        }

        println!();
        println!("  Archive:   {}", report.archive_path.display());
        println!(
            "  Size:      {} ({} members)",
            format_bytes(report.size_bytes),
            report.member_count
        );
        println!("  Includes:  {}", report.top_level_paths.join(", "));
        match &report.manifest_path {
            Some(path) => println!("  Manifest:  {}", path.display()),
            None => println!("  Manifest:  not written"),
        }
        if !report.removed_archives.is_empty() {
            println!(
                "  Retention: removed {} old archive(s)",
                report.removed_archives.len()
            );
        }
        println!("  Duration:  {}", format_duration(report.duration));

        if !report.warnings.is_empty() {
            println!("  Warnings:  {}", report.warnings.len());
            for warning in &report.warnings {
                println!("    [{}] {}", warning.step, warning.message);
            }
        }

        self.print_separator();
    }

    fn print_plain_archive_report(&self, report: &ArchiveReport) {
        println!("COMPLETED: Backup");
        println!("Archive: {}", report.archive_path.display());
        println!("Size: {} bytes", report.size_bytes);
        println!("Members: {}", report.member_count);
        println!("Removed: {}", report.removed_archives.len());
        if !report.warnings.is_empty() {
            println!("Warnings: {}", report.warnings.len());
        }
    }

    fn print_human_restore_report(&self, report: &RestoreReport) {
        if self.quiet {
            return;
        }

        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Restore completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Restore completed!");
        }

        println!();
        println!("  Archive:   {}", report.archive_path.display());
        println!("  Target:    {}", report.target.display());
        println!("  Extracted: {} entries", report.extracted_count);
        match &report.snapshot_path {
            Some(path) => println!("  Snapshot:  {}", path.display()),
            None => println!("  Snapshot:  none needed"),
        }

        if let Some(validation) = &report.validation {
            for dir in &validation.directories {
                match dir.file_count {
                    Some(count) => println!("  {}: {} files", dir.name, count),
                    None => println!("  {}: absent", dir.name),
                }
            }
            let missing = validation.missing();
            if !missing.is_empty() {
                println!("  Missing:   {}", missing.join(", "));
            }
        }

        println!("  Duration:  {}", format_duration(report.duration));

        if !report.warnings.is_empty() {
            println!("  Warnings:  {}", report.warnings.len());
            for warning in &report.warnings {
                println!("    [{}] {}", warning.step, warning.message);
            }
        }

        self.print_separator();
    }

    fn print_plain_restore_report(&self, report: &RestoreReport) {
        println!("COMPLETED: Restore");
        println!("Archive: {}", report.archive_path.display());
        println!("Target: {}", report.target.display());
        println!("Extracted: {}", report.extracted_count);
        if let Some(path) = &report.snapshot_path {
            println!("Snapshot: {}", path.display());
        }
        if !report.warnings.is_empty() {
            println!("Warnings: {}", report.warnings.len());
        }
    }
}

impl Reporter for OutputFormatter {
    fn step_started(&self, name: &str) {
        self.start_operation(name);
    }

    fn info(&self, message: &str) {
        OutputFormatter::info(self, message);
    }

    fn warning(&self, message: &str) {
        OutputFormatter::warning(self, message);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
