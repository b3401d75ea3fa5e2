use crate::formats::{BamIndexProbe, FastaIndexProbe, TabixIndexProbe};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use tracing::debug;

/// Index files kept next to the data file they describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sidecar {
    Bai,
    Tbi,
    Fai,
}

impl Sidecar {
    pub fn extension(self) -> &'static str {
        match self {
            Sidecar::Bai => "bai",
            Sidecar::Tbi => "tbi",
            Sidecar::Fai => "fai",
        }
    }

    /// `sample.bam` -> `sample.bam.bai`
    pub fn path_for(self, source: &Path) -> PathBuf {
        append_extension(source, self.extension())
    }
}

pub(crate) fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Column layout handed to tabix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabixPreset {
    Gff,
    Columns {
        sequence: u8,
        start: u8,
        end: u8,
        zero_based: bool,
    },
}

impl TabixPreset {
    /// bedGraph: chrom, 0-based start, end.
    pub const BEDGRAPH: TabixPreset = TabixPreset::Columns {
        sequence: 1,
        start: 2,
        end: 3,
        zero_based: true,
    };

    fn args(self) -> Vec<String> {
        match self {
            TabixPreset::Gff => vec!["-p".to_string(), "gff".to_string()],
            TabixPreset::Columns {
                sequence,
                start,
                end,
                zero_based,
            } => {
                let mut args = vec![
                    "-s".to_string(),
                    sequence.to_string(),
                    "-b".to_string(),
                    start.to_string(),
                    "-e".to_string(),
                    end.to_string(),
                ];
                if zero_based {
                    args.push("-0".to_string());
                }
                args
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{program} is not installed or not on PATH")]
    NotInstalled { program: String },

    #[error("{program} rejected unsorted input: {message}")]
    Unsorted { program: String, message: String },

    #[error("{program} failed ({status}): {message}")]
    Failed {
        program: String,
        status: String,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ToolError {
    pub fn is_unsorted(&self) -> bool {
        matches!(self, ToolError::Unsorted { .. })
    }
}

/// The genomics toolkit that builds compressed files and their indexes.
///
/// Every build must land atomically: outputs are written to a temporary
/// path and renamed into place, so readers never see a partial sidecar.
pub trait IndexTool: Send + Sync {
    /// BGZF-compress `src` into `dst`.
    fn compress(&self, src: &Path, dst: &Path) -> Result<(), ToolError>;

    /// Build `path.tbi` for a BGZF-compressed file.
    fn tabix(&self, path: &Path, preset: TabixPreset) -> Result<(), ToolError>;

    /// Build `path.bai`.
    fn index_alignment(&self, path: &Path) -> Result<(), ToolError>;

    /// Build `path.fai`.
    fn index_reference(&self, path: &Path) -> Result<(), ToolError>;

    /// Structural check of an existing sidecar against its source.
    fn validate(&self, source: &Path, sidecar: Sidecar) -> crate::Result<()>;
}

/// htslib command line tools: `bgzip`, `tabix` and `samtools`.
#[derive(Debug, Clone)]
pub struct Htslib {
    bgzip: String,
    tabix: String,
    samtools: String,
}

impl Default for Htslib {
    fn default() -> Self {
        Self::new("bgzip", "tabix", "samtools")
    }
}

impl Htslib {
    pub fn new(
        bgzip: impl Into<String>,
        tabix: impl Into<String>,
        samtools: impl Into<String>,
    ) -> Self {
        Self {
            bgzip: bgzip.into(),
            tabix: tabix.into(),
            samtools: samtools.into(),
        }
    }

    fn run(&self, program: &str, command: &mut Command) -> Result<Output, ToolError> {
        debug!(?command, "running {}", program);

        let output = command
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    ToolError::NotInstalled {
                        program: program.to_string(),
                    }
                } else {
                    ToolError::Io(e)
                }
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(classify_failure(program, output.status, &output.stderr))
        }
    }
}

impl IndexTool for Htslib {
    fn compress(&self, src: &Path, dst: &Path) -> Result<(), ToolError> {
        let staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".gz.tmp")
            .tempfile_in(parent_dir(dst))?;
        let stdout = staged.as_file().try_clone()?;

        self.run(
            &self.bgzip,
            Command::new(&self.bgzip)
                .arg("-c")
                .arg(src)
                .stdout(Stdio::from(stdout)),
        )?;

        staged.persist(dst).map_err(|e| ToolError::Io(e.error))?;
        Ok(())
    }

    fn tabix(&self, path: &Path, preset: TabixPreset) -> Result<(), ToolError> {
        // tabix always writes next to its input, so index a hard link inside
        // a staging directory and move the finished index over.
        let staging = tempfile::Builder::new()
            .prefix(".tabix")
            .tempdir_in(parent_dir(path))?;
        let file_name = path.file_name().unwrap_or_else(|| OsStr::new("input.gz"));
        let staged = staging.path().join(file_name);
        fs::hard_link(path, &staged)?;

        self.run(
            &self.tabix,
            Command::new(&self.tabix).args(preset.args()).arg("-f").arg(&staged),
        )?;

        fs::rename(Sidecar::Tbi.path_for(&staged), Sidecar::Tbi.path_for(path))?;
        Ok(())
    }

    fn index_alignment(&self, path: &Path) -> Result<(), ToolError> {
        let staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".bai.tmp")
            .tempfile_in(parent_dir(path))?;

        self.run(
            &self.samtools,
            Command::new(&self.samtools)
                .arg("index")
                .arg("-o")
                .arg(staged.path())
                .arg(path),
        )?;

        staged
            .persist(Sidecar::Bai.path_for(path))
            .map_err(|e| ToolError::Io(e.error))?;
        Ok(())
    }

    fn index_reference(&self, path: &Path) -> Result<(), ToolError> {
        let staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".fai.tmp")
            .tempfile_in(parent_dir(path))?;

        self.run(
            &self.samtools,
            Command::new(&self.samtools)
                .arg("faidx")
                .arg(path)
                .arg("--fai-idx")
                .arg(staged.path()),
        )?;

        staged
            .persist(Sidecar::Fai.path_for(path))
            .map_err(|e| ToolError::Io(e.error))?;
        Ok(())
    }

    fn validate(&self, source: &Path, sidecar: Sidecar) -> crate::Result<()> {
        let index_path = sidecar.path_for(source);
        match sidecar {
            Sidecar::Bai => BamIndexProbe::validate(source, &index_path),
            Sidecar::Tbi => TabixIndexProbe::validate(source, &index_path),
            Sidecar::Fai => FastaIndexProbe::validate(source, &index_path),
        }
    }
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

const UNSORTED_MARKERS: [&str; 4] = ["unsorted", "not sorted", "out of order", "not continuous"];

fn classify_failure(program: &str, status: ExitStatus, stderr: &[u8]) -> ToolError {
    let message = String::from_utf8_lossy(stderr).trim().to_string();
    let lowered = message.to_lowercase();

    if UNSORTED_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        ToolError::Unsorted {
            program: program.to_string(),
            message,
        }
    } else {
        ToolError::Failed {
            program: program.to_string(),
            status: status.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_status() -> ExitStatus {
        Command::new("false")
            .status()
            .unwrap_or_else(|_| Command::new("sh").args(["-c", "exit 1"]).status().unwrap())
    }

    #[test]
    fn test_sidecar_paths_append_extension() {
        let bam = Path::new("/data/group/sample.bam");
        assert_eq!(
            Sidecar::Bai.path_for(bam),
            PathBuf::from("/data/group/sample.bam.bai")
        );
        assert_eq!(
            Sidecar::Tbi.path_for(Path::new("genes.sorted.gtf.gz")),
            PathBuf::from("genes.sorted.gtf.gz.tbi")
        );
    }

    #[test]
    fn test_bedgraph_preset_args() {
        assert_eq!(
            TabixPreset::BEDGRAPH.args(),
            ["-s", "1", "-b", "2", "-e", "3", "-0"]
        );
        assert_eq!(TabixPreset::Gff.args(), ["-p", "gff"]);
    }

    #[test]
    fn test_classify_unsorted_failure() {
        let err = classify_failure(
            "tabix",
            failed_status(),
            b"[E::hts_idx_push] Unsorted positions on sequence #1: 14409 followed by 11869\n",
        );
        assert!(err.is_unsorted());

        let err = classify_failure(
            "tabix",
            failed_status(),
            b"[E::hts_idx_push] Chromosome blocks not continuous\n",
        );
        assert!(err.is_unsorted());
    }

    #[test]
    fn test_classify_other_failure() {
        let err = classify_failure("tabix", failed_status(), b"[tabix] the compression of 'x' is not BGZF\n");
        assert!(!err.is_unsorted());
        assert!(err.to_string().contains("not BGZF"));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let tool = Htslib::new("bgzip", "definitely-not-a-tabix-binary", "samtools");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gtf.gz");
        fs::write(&path, b"").unwrap();

        let err = tool.tabix(&path, TabixPreset::Gff).unwrap_err();
        assert!(matches!(err, ToolError::NotInstalled { .. }));
        assert!(!Sidecar::Tbi.path_for(&path).exists());
    }
}
