use super::{Groups, ResourceCatalog};
use crate::index::{AnnotationIndexer, IndexTool, TrackIndexer};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Group name used when track files sit directly in the scanned root.
pub const FLAT_GROUP: &str = "Files";

/// Track files served from the alignment directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// `.bam`
    Alignment,
    /// `.bdg` / `.bedgraph`, optionally gzipped
    Signal,
}

impl TrackKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".bam") {
            return Some(TrackKind::Alignment);
        }
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".bdg") || name.ends_with(".bedgraph") {
            return Some(TrackKind::Signal);
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogOptions {
    /// Sort the annotation before indexing it.
    pub sort_annotation: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            sort_annotation: true,
        }
    }
}

/// Indexes every track file under a root directory and groups them.
pub struct CatalogBuilder<'a> {
    tool: &'a dyn IndexTool,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(tool: &'a dyn IndexTool) -> Self {
        Self { tool }
    }

    /// Track files directly inside `root` form the single [`FLAT_GROUP`].
    /// Otherwise every immediate subdirectory holding track files becomes a
    /// group of its own.
    pub fn scan(&self, root: &Path) -> Result<Groups> {
        let root = std::path::absolute(root)?;
        if !root.is_dir() {
            return Err(Error::format(&root, "not a directory"));
        }

        let mut groups = Groups::new();
        let (files, subdirs) = list_dir(&root)?;

        if files.iter().any(|path| TrackKind::from_path(path).is_some()) {
            debug!(root = %root.display(), "flat track directory");
            let tracks = self.index_tracks(&files);
            if !tracks.is_empty() {
                groups.insert(FLAT_GROUP.to_string(), tracks);
            }
            return Ok(groups);
        }

        for dir in subdirs {
            let Some(group) = dir.file_name().and_then(|name| name.to_str()) else {
                warn!(path = %dir.display(), "skipping directory with non UTF-8 name");
                continue;
            };
            let (files, _) = list_dir(&dir)?;
            let tracks = self.index_tracks(&files);
            if tracks.is_empty() {
                debug!(group, "no track files");
                continue;
            }
            groups.insert(group.to_string(), tracks);
        }

        Ok(groups)
    }

    fn index_tracks(&self, files: &[PathBuf]) -> BTreeMap<String, PathBuf> {
        let indexer = TrackIndexer::new(self.tool);
        let mut tracks = BTreeMap::new();

        for path in files {
            let indexed = match TrackKind::from_path(path) {
                Some(TrackKind::Alignment) => indexer.ensure_alignment_index(path),
                Some(TrackKind::Signal) => indexer.ensure_signal_index(path),
                None => continue,
            };

            match indexed {
                Ok(target) => {
                    if let Some(name) = target.file_name().and_then(|name| name.to_str()) {
                        tracks.insert(name.to_string(), target);
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping track file"),
            }
        }

        tracks
    }
}

/// Regular files and subdirectories of `dir`, each sorted by path.
fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

/// Index the annotation, the reference and every track file, and collect
/// their absolute paths.
pub fn build_catalog(
    bam_root: &Path,
    gtf: &Path,
    fasta: &Path,
    tool: &dyn IndexTool,
    options: CatalogOptions,
) -> Result<ResourceCatalog> {
    let gtf = std::path::absolute(gtf)?;
    let fasta = std::path::absolute(fasta)?;

    let annotation = AnnotationIndexer::new(tool)
        .sort(options.sort_annotation)
        .index(&gtf)?;

    if !fasta.is_file() {
        return Err(Error::format(&fasta, "reference file not found"));
    }
    let fasta = TrackIndexer::new(tool).ensure_reference_index(&fasta)?;

    let groups = CatalogBuilder::new(tool).scan(bam_root)?;
    info!(
        groups = groups.len(),
        files = groups.values().map(BTreeMap::len).sum::<usize>(),
        "catalog built"
    );

    Ok(ResourceCatalog {
        groups,
        annotation,
        fasta,
    })
}
