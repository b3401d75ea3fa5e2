//! The resource catalog: where every served file lives on disk.
//!
//! Built once at startup by [`build_catalog`], persisted as JSON and
//! read-only afterwards.

mod builder;
pub mod natural;

pub use builder::{CatalogBuilder, CatalogOptions, FLAT_GROUP, TrackKind, build_catalog};

use crate::index::{Sidecar, parent_dir};
use crate::types::ReferenceKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Group name -> file name -> absolute path.
pub type Groups = BTreeMap<String, BTreeMap<String, PathBuf>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCatalog {
    #[serde(rename = "BAM")]
    pub groups: Groups,

    /// BGZF-compressed, tabix-indexed annotation.
    #[serde(rename = "REFERENCE")]
    pub annotation: PathBuf,

    #[serde(rename = "FASTA")]
    pub fasta: PathBuf,
}

impl ResourceCatalog {
    /// Write the catalog as JSON with four-space indentation.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');

        let mut staged = tempfile::Builder::new()
            .prefix(".catalog")
            .tempfile_in(parent_dir(path))?;
        staged.write_all(&buf)?;
        staged.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let catalog: ResourceCatalog = serde_json::from_str(&text)?;

        if catalog.annotation.as_os_str().is_empty() {
            return Err(Error::format(path, "catalog has no REFERENCE entry"));
        }
        if catalog.fasta.as_os_str().is_empty() {
            return Err(Error::format(path, "catalog has no FASTA entry"));
        }
        Ok(catalog)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// File names of `group` in presentation order.
    pub fn list_ordered_files(&self, group: &str) -> Result<Vec<String>> {
        let files = self
            .groups
            .get(group)
            .ok_or_else(|| Error::NotFound(format!("group {group}")))?;
        let mut names: Vec<String> = files.keys().cloned().collect();
        natural::sort_names(&mut names);
        Ok(names)
    }

    /// Every group with its files in presentation order.
    pub fn ordered_listing(&self) -> BTreeMap<String, Vec<String>> {
        self.groups
            .iter()
            .map(|(group, files)| {
                let mut names: Vec<String> = files.keys().cloned().collect();
                natural::sort_names(&mut names);
                (group.clone(), names)
            })
            .collect()
    }

    /// Path of a catalogued file, or of its index when `want_index` is set.
    pub fn resolve_file(&self, group: &str, file: &str, want_index: bool) -> Result<PathBuf> {
        let path = self
            .groups
            .get(group)
            .and_then(|files| files.get(file))
            .ok_or_else(|| Error::NotFound(format!("{group}/{file}")))?;

        if !want_index {
            return Ok(path.clone());
        }
        let sidecar = if TrackKind::from_path(path) == Some(TrackKind::Alignment) {
            Sidecar::Bai
        } else {
            Sidecar::Tbi
        };
        Ok(sidecar.path_for(path))
    }

    pub fn resolve_reference(&self, kind: ReferenceKind, want_index: bool) -> PathBuf {
        match (kind, want_index) {
            (ReferenceKind::Fasta, false) => self.fasta.clone(),
            (ReferenceKind::Fasta, true) => Sidecar::Fai.path_for(&self.fasta),
            (ReferenceKind::Annotation, false) => self.annotation.clone(),
            (ReferenceKind::Annotation, true) => Sidecar::Tbi.path_for(&self.annotation),
        }
    }
}
