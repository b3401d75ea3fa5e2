//! Format handling for the files the catalog serves.
//!
//! - [`annotation`] - GTF sniffing and record parsing for the sort pass
//! - [`BamIndexProbe`] - BAM index files (`.bai`)
//! - [`TabixIndexProbe`] - tabix index files (`.tbi`)
//! - [`FastaIndexProbe`] - FASTA index files (`.fai`)
//!
//! The probes only read index files; building them is left to the
//! toolkit behind [`crate::index::IndexTool`].

pub mod annotation;
mod bam;
mod fasta;
mod tabix;

pub use bam::BamIndexProbe;
pub use fasta::FastaIndexProbe;
pub use tabix::TabixIndexProbe;
