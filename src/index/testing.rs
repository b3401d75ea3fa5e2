//! Recording stand-in for the htslib toolkit.

use super::{IndexTool, Sidecar, TabixPreset, ToolError};
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct FakeTool {
    calls: Mutex<Vec<String>>,
    unsorted_rejections: Mutex<u32>,
    broken: bool,
}

impl FakeTool {
    /// Sidecar content that fails validation.
    pub const CORRUPT: &'static [u8] = b"corrupt";

    /// Reject the next `count` tabix runs as unsorted.
    pub fn rejecting_unsorted(count: u32) -> Self {
        Self {
            unsorted_rejections: Mutex::new(count),
            ..Self::default()
        }
    }

    /// Fail every tabix run for a reason unrelated to sort order.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &str, path: &Path) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation} {name}"));
    }
}

impl IndexTool for FakeTool {
    fn compress(&self, src: &Path, dst: &Path) -> std::result::Result<(), ToolError> {
        self.record("compress", src);
        fs::copy(src, dst)?;
        Ok(())
    }

    fn tabix(&self, path: &Path, _preset: TabixPreset) -> std::result::Result<(), ToolError> {
        self.record("tabix", path);

        if self.broken {
            return Err(ToolError::Failed {
                program: "tabix".to_string(),
                status: "exit status: 1".to_string(),
                message: "the compression is not BGZF".to_string(),
            });
        }

        let mut remaining = self.unsorted_rejections.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(ToolError::Unsorted {
                program: "tabix".to_string(),
                message: "Unsorted positions on sequence #1".to_string(),
            });
        }

        fs::write(Sidecar::Tbi.path_for(path), b"tbi")?;
        Ok(())
    }

    fn index_alignment(&self, path: &Path) -> std::result::Result<(), ToolError> {
        self.record("index", path);
        fs::write(Sidecar::Bai.path_for(path), b"bai")?;
        Ok(())
    }

    fn index_reference(&self, path: &Path) -> std::result::Result<(), ToolError> {
        self.record("faidx", path);
        fs::write(Sidecar::Fai.path_for(path), b"fai")?;
        Ok(())
    }

    fn validate(&self, source: &Path, sidecar: Sidecar) -> Result<()> {
        let content = fs::read(sidecar.path_for(source))?;
        if content == Self::CORRUPT {
            return Err(Error::Internal("corrupt index".to_string()));
        }
        Ok(())
    }
}
