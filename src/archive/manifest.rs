use crate::archive::retention::manifest_sibling;
use crate::archive::verify::ArchiveInventory;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Number of member paths listed before the manifest truncates.
const MEMBER_LISTING_LIMIT: usize = 50;

/// Writes the human-readable `.manifest` sidecar next to a published archive.
/// Best-effort text assembly; the archive itself is already verified by the
/// time this runs.
pub fn write_archive_manifest(
    archive_path: &Path,
    created_at: DateTime<Utc>,
    size_bytes: u64,
    inventory: &ArchiveInventory,
) -> Result<PathBuf> {
    let manifest_path = manifest_sibling(archive_path);
    let mut file = fs::File::create(&manifest_path)?;

    let archive_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    writeln!(file, "Automata Knowledge Base Backup Manifest")?;
    writeln!(file, "=======================================")?;
    writeln!(file)?;
    writeln!(file, "Archive: {}", archive_name)?;
    writeln!(file, "Path: {}", archive_path.display())?;
    writeln!(
        file,
        "Created: {}",
        created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "Size: {} bytes ({})", size_bytes, format_bytes(size_bytes))?;
    writeln!(file, "Members: {}", inventory.member_count)?;
    writeln!(file, "Host: {}", env_or_unknown("HOSTNAME"))?;
    writeln!(file, "User: {}", env_or_unknown("USER"))?;
    writeln!(file)?;

    writeln!(file, "Included top-level paths:")?;
    for top in inventory.top_level_paths() {
        writeln!(file, "  {}", top)?;
    }
    writeln!(file)?;

    writeln!(file, "File listing (first {} entries):", MEMBER_LISTING_LIMIT)?;
    for member in inventory.members.iter().take(MEMBER_LISTING_LIMIT) {
        writeln!(file, "  {}", member.display())?;
    }
    if inventory.member_count > MEMBER_LISTING_LIMIT {
        writeln!(
            file,
            "  ... and {} more",
            inventory.member_count - MEMBER_LISTING_LIMIT
        )?;
    }
    writeln!(file)?;

    writeln!(file, "To restore this backup:")?;
    writeln!(file, "  restore {} [target_dir]", archive_path.display())?;

    Ok(manifest_path)
}

fn env_or_unknown(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| "unknown".to_string())
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
