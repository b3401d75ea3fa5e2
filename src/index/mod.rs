//! Sidecar index maintenance.
//!
//! Decides when index files must be (re)built and drives the external
//! toolkit that builds them:
//!
//! - [`AnnotationIndexer`] - validate, sort and tabix-index a GTF file
//! - [`TrackIndexer`] - `.bai` for BAM, `.tbi` for bedGraph, `.fai` for FASTA
//! - [`StalenessChecker`] - existence, timestamp and validity checks
//! - [`IndexTool`] - the toolkit seam, implemented by [`Htslib`]

mod annotation;
mod staleness;
mod tool;
mod tracks;

#[cfg(test)]
pub(crate) mod testing;

pub use annotation::AnnotationIndexer;
pub use staleness::{IndexState, StalenessChecker, is_older, modified};
pub use tool::{Htslib, IndexTool, Sidecar, TabixPreset, ToolError};
pub(crate) use tool::parent_dir;
pub use tracks::TrackIndexer;
