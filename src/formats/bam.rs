use crate::{Error, Result};
use noodles::bam;
use noodles::bam::bai;
use std::fs::File;
use std::path::Path;

pub struct BamIndexProbe;

impl BamIndexProbe {
    /// Check that `index_path` is a readable BAI index describing the same
    /// reference sequences as the BAM header.
    pub fn validate(bam_path: &Path, index_path: &Path) -> Result<()> {
        let index = bai::read(index_path)
            .map_err(|e| Error::format(index_path, format!("unreadable BAI index: {e}")))?;

        let file = File::open(bam_path)
            .map_err(|e| Error::format(bam_path, format!("cannot open: {e}")))?;

        // bam::io::Reader::new wraps the file in a BGZF reader internally
        let mut reader = bam::io::Reader::new(file);
        let header = reader
            .read_header()
            .map_err(|e| Error::format(bam_path, format!("unreadable BAM header: {e}")))?;

        let indexed = index.reference_sequences().len();
        let declared = header.reference_sequences().len();
        if indexed != declared {
            return Err(Error::format(
                index_path,
                format!("covers {indexed} reference sequences, BAM header declares {declared}"),
            ));
        }

        Ok(())
    }
}
