use crate::{Error, Result};
use noodles::fasta::fai;
use std::path::Path;

pub struct FastaIndexProbe;

impl FastaIndexProbe {
    /// Check that `index_path` is a FAI index whose records fit inside the FASTA file.
    pub fn validate(fasta_path: &Path, index_path: &Path) -> Result<()> {
        let index = fai::read(index_path)
            .map_err(|e| Error::format(index_path, format!("unreadable FAI index: {e}")))?;

        let fasta_len = std::fs::metadata(fasta_path)?.len();

        // FAI Index wraps Vec<Record>, access via as_ref()
        for record in index.as_ref() {
            if record.offset() > fasta_len {
                return Err(Error::format(
                    index_path,
                    format!(
                        "record {} starts past the end of the FASTA file",
                        String::from_utf8_lossy(record.name())
                    ),
                ));
            }
        }

        Ok(())
    }
}
