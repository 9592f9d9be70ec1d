use crate::error::{BackupError, Result};
use crate::scanner::SourceFile;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::path::Path;
use tar::Builder;

/// Streams source files into a gzip-compressed tarball.
///
/// Callers write to a staging path first and rename into place only after the
/// archive has been verified, so a final-named archive is always a verified
/// one.
pub struct ArchiveWriter {
    compression: Compression,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::default(),
        }
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression = Compression::new(level);
        self
    }

    /// Write all sources into `staging_path`. Returns the archive byte size.
    pub fn write<F>(
        &self,
        sources: &[SourceFile],
        staging_path: &Path,
        mut on_file: F,
    ) -> Result<u64>
    where
        F: FnMut(&SourceFile),
    {
        let file = fs::File::create(staging_path).map_err(|e| BackupError::ArchiveCreation {
            message: format!(
                "Failed to create archive file {}: {}",
                staging_path.display(),
                e
            ),
        })?;

        let encoder = GzEncoder::new(file, self.compression);
        let mut builder = Builder::new(encoder);

        for source in sources {
            // Sources can disappear between scan and write; treat that as a
            // creation failure so the run aborts with the staged file intact.
            let mut src_file =
                fs::File::open(&source.source_path).map_err(|e| BackupError::ArchiveCreation {
                    message: format!("Failed to open {}: {}", source.source_path.display(), e),
                })?;

            builder
                .append_file(&source.relative_path, &mut src_file)
                .map_err(|e| BackupError::ArchiveCreation {
                    message: format!(
                        "Failed to append {} to archive: {}",
                        source.relative_path.display(),
                        e
                    ),
                })?;

            on_file(source);
        }

        builder
            .into_inner()
            .map_err(|e| BackupError::ArchiveCreation {
                message: format!("Failed to flush archive stream: {}", e),
            })?
            .finish()
            .map_err(|e| BackupError::ArchiveCreation {
                message: format!("Failed to finish compression: {}", e),
            })?;

        let metadata = fs::metadata(staging_path)?;
        Ok(metadata.len())
    }

    /// Move a verified staged archive to its final name. The rename is atomic
    /// within the backup directory.
    pub fn publish(&self, staging_path: &Path, final_path: &Path) -> Result<()> {
        fs::rename(staging_path, final_path).map_err(|e| BackupError::ArchiveCreation {
            message: format!(
                "Failed to publish archive {} -> {}: {}",
                staging_path.display(),
                final_path.display(),
                e
            ),
        })
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
