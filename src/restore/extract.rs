use crate::error::{BackupError, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::Path;
use tar::Archive;

/// Unpack an archive over the target directory.
///
/// This is a non-atomic overlay: a failure partway through leaves the target
/// partially overwritten, and the pre-restore snapshot is the only rollback
/// path. Entries that would escape the target directory are refused.
pub fn extract_archive<F>(archive_path: &Path, target: &Path, mut on_entry: F) -> Result<usize>
where
    F: FnMut(&Path),
{
    let file = fs::File::open(archive_path).map_err(|e| BackupError::Extraction {
        message: format!("cannot open archive {}: {}", archive_path.display(), e),
    })?;

    fs::create_dir_all(target).map_err(|e| BackupError::Extraction {
        message: format!("cannot create target {}: {}", target.display(), e),
    })?;

    let mut archive = Archive::new(GzDecoder::new(file));
    let mut extracted = 0;

    let entries = archive.entries().map_err(|e| BackupError::Extraction {
        message: format!("cannot read entries of {}: {}", archive_path.display(), e),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| BackupError::Extraction {
            message: format!("corrupt entry in {}: {}", archive_path.display(), e),
        })?;

        let entry_path = entry
            .path()
            .map_err(|e| BackupError::Extraction {
                message: format!("invalid entry path: {}", e),
            })?
            .to_path_buf();

        let unpacked = entry.unpack_in(target).map_err(|e| BackupError::Extraction {
            message: format!("failed to unpack {}: {}", entry_path.display(), e),
        })?;

        // unpack_in returns false for entries it refuses (path escapes)
        if !unpacked {
            return Err(BackupError::Extraction {
                message: format!(
                    "refused to unpack {} outside target directory",
                    entry_path.display()
                ),
            });
        }

        on_entry(&entry_path);
        extracted += 1;
    }

    Ok(extracted)
}
