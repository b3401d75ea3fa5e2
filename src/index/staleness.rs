use super::{IndexTool, Sidecar};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Freshness of one sidecar relative to its source. Recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Missing,
    Stale,
    Fresh,
}

pub fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Whether `path` was last modified before `than`. Unreadable timestamps
/// never count as older.
pub fn is_older(path: &Path, than: &Path) -> bool {
    match (modified(path), modified(than)) {
        (Ok(path_time), Ok(than_time)) => path_time < than_time,
        _ => false,
    }
}

pub struct StalenessChecker<'a> {
    tool: &'a dyn IndexTool,
}

impl<'a> StalenessChecker<'a> {
    pub fn new(tool: &'a dyn IndexTool) -> Self {
        Self { tool }
    }

    pub fn state(&self, source: &Path, sidecar: Sidecar) -> IndexState {
        let index_path = sidecar.path_for(source);

        if !index_path.exists() {
            return IndexState::Missing;
        }

        if is_older(&index_path, source) {
            debug!(path = %index_path.display(), "index is older than its source");
            return IndexState::Stale;
        }

        if let Err(e) = self.tool.validate(source, sidecar) {
            debug!(path = %index_path.display(), error = %e, "index failed validation");
            return IndexState::Stale;
        }

        IndexState::Fresh
    }

    /// Decide whether any of `sidecars` must be (re)built for `source`.
    ///
    /// Stale sidecars are removed first. If one cannot be removed the stale
    /// index is kept and `false` is returned.
    pub fn needs_rebuild(&self, source: &Path, sidecars: &[Sidecar]) -> bool {
        for &sidecar in sidecars {
            match self.state(source, sidecar) {
                IndexState::Fresh => continue,
                IndexState::Missing => return true,
                IndexState::Stale => {
                    let index_path = sidecar.path_for(source);
                    return match fs::remove_file(&index_path) {
                        Ok(()) => true,
                        Err(e) => {
                            warn!(
                                path = %index_path.display(),
                                error = %e,
                                "cannot remove stale index, keeping it"
                            );
                            false
                        }
                    };
                }
            }
        }

        false
    }
}
