use super::staleness::{StalenessChecker, is_older};
use super::tool::append_extension;
use super::{IndexTool, Sidecar, TabixPreset};
use crate::formats::annotation::is_gzip;
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Keeps the sidecar indexes of alignment, signal and reference files
/// current. Every call is idempotent.
pub struct TrackIndexer<'a> {
    tool: &'a dyn IndexTool,
}

impl<'a> TrackIndexer<'a> {
    pub fn new(tool: &'a dyn IndexTool) -> Self {
        Self { tool }
    }

    /// Make sure `path.bai` exists, is newer than `path` and can be read.
    pub fn ensure_alignment_index(&self, path: &Path) -> Result<PathBuf> {
        if StalenessChecker::new(self.tool).needs_rebuild(path, &[Sidecar::Bai]) {
            info!(path = %path.display(), "creating alignment index");
            self.tool
                .index_alignment(path)
                .map_err(|source| Error::IndexTool {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(path.to_path_buf())
    }

    /// Make sure a bedGraph track is BGZF-compressed and tabix-indexed.
    ///
    /// Plain input is compressed to `path.gz`, which is what gets returned.
    pub fn ensure_signal_index(&self, path: &Path) -> Result<PathBuf> {
        let tool_error = |source| Error::IndexTool {
            path: path.to_path_buf(),
            source,
        };

        let target = if is_gzip(path)? {
            path.to_path_buf()
        } else {
            let target = append_extension(path, "gz");
            if !target.exists() || is_older(&target, path) {
                info!(path = %path.display(), "compressing signal track");
                self.tool.compress(path, &target).map_err(tool_error)?;
                remove_if_exists(&Sidecar::Tbi.path_for(&target))?;
            }
            target
        };

        if !Sidecar::Tbi.path_for(&target).exists() {
            info!(path = %target.display(), "creating signal index");
            self.tool
                .tabix(&target, TabixPreset::BEDGRAPH)
                .map_err(tool_error)?;
        }

        Ok(target)
    }

    /// Make sure `path.fai` exists, is newer than `path` and can be read.
    pub fn ensure_reference_index(&self, path: &Path) -> Result<PathBuf> {
        if StalenessChecker::new(self.tool).needs_rebuild(path, &[Sidecar::Fai]) {
            info!(path = %path.display(), "creating reference index");
            self.tool
                .index_reference(path)
                .map_err(|source| Error::IndexTool {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(path.to_path_buf())
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
