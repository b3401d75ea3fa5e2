use crate::{Error, Result};
use noodles::tabix;
use std::path::Path;

pub struct TabixIndexProbe;

impl TabixIndexProbe {
    /// Check that `index_path` parses as a tabix index.
    pub fn validate(_path: &Path, index_path: &Path) -> Result<()> {
        tabix::read(index_path)
            .map(|_| ())
            .map_err(|e| Error::format(index_path, format!("unreadable tabix index: {e}")))
    }
}
