use super::staleness::{StalenessChecker, is_older};
use super::tool::{append_extension, parent_dir};
use super::{IndexTool, Sidecar, TabixPreset, ToolError};
use crate::formats::annotation::{open_text, parse_record, sniff};
use crate::interval::Interval;
use crate::{Error, Result};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An unsorted rejection from tabix triggers one re-sort, never more.
const MAX_SORT_RETRIES: u32 = 1;

/// Where the artifacts derived from an annotation file live.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnnotationPaths {
    /// The input itself when already compressed, otherwise `input.gz`.
    compressed: PathBuf,
    /// `name.sorted.ext`
    sorted: PathBuf,
    /// `name.sorted.ext.gz`
    sorted_compressed: PathBuf,
}

impl AnnotationPaths {
    fn new(input: &Path, input_compressed: bool) -> Result<Self> {
        let file_name = input
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::format(input, "annotation file name is not valid UTF-8"))?;

        let base = file_name.strip_suffix(".gz").unwrap_or(file_name);
        let sorted_name = match base.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => format!("{stem}.sorted.{extension}"),
            _ => format!("{base}.sorted"),
        };
        let sorted = input.with_file_name(sorted_name);

        let compressed = if input_compressed {
            input.to_path_buf()
        } else {
            append_extension(input, "gz")
        };

        Ok(Self {
            compressed,
            sorted_compressed: append_extension(&sorted, "gz"),
            sorted,
        })
    }
}

/// Validates, sorts and tabix-indexes a GTF annotation file.
///
/// `Unvalidated -> Validated -> [Sorted] -> Indexed`. A tabix rejection for
/// unsorted input sends the file back through the sort once; a second
/// rejection is [`Error::SortRetryExhausted`]. Any other tool failure is fatal.
pub struct AnnotationIndexer<'a> {
    tool: &'a dyn IndexTool,
    sort: bool,
}

impl<'a> AnnotationIndexer<'a> {
    pub fn new(tool: &'a dyn IndexTool) -> Self {
        Self { tool, sort: true }
    }

    /// Whether to sort before the first indexing attempt. Defaults to `true`.
    #[must_use]
    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Returns the path of the compressed, indexed annotation file.
    pub fn index(&self, input: &Path) -> Result<PathBuf> {
        let sniffed = sniff(input)?;
        if !sniffed.is_annotation {
            return Err(Error::format(input, "not a valid GTF annotation file"));
        }

        let paths = AnnotationPaths::new(input, sniffed.is_compressed)?;

        if let Some(indexed) = self.fresh_index(input, sniffed.is_compressed, &paths) {
            debug!(path = %indexed.display(), "annotation index is up to date");
            return Ok(indexed);
        }

        let mut sort = self.sort;
        let mut retries = 0;

        loop {
            let (source, target) = if sort {
                self.sort_records(input, &paths.sorted)?;
                (paths.sorted.as_path(), paths.sorted_compressed.as_path())
            } else {
                (input, paths.compressed.as_path())
            };

            info!(path = %target.display(), "creating annotation index");
            match self.compress_and_index(source, target) {
                Ok(()) => return Ok(target.to_path_buf()),
                Err(e) if e.is_unsorted() => {
                    if retries >= MAX_SORT_RETRIES {
                        return Err(Error::SortRetryExhausted(input.to_path_buf()));
                    }
                    warn!(path = %input.display(), error = %e, "annotation file needs to be sorted");
                    retries += 1;
                    sort = true;
                }
                Err(e) => {
                    return Err(Error::IndexTool {
                        path: input.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
    }

    /// First existing artifact that is at least as new as the input and has
    /// a fresh `.tbi`.
    fn fresh_index(&self, input: &Path, compressed: bool, paths: &AnnotationPaths) -> Option<PathBuf> {
        let checker = StalenessChecker::new(self.tool);

        let mut candidates = Vec::with_capacity(2);
        if compressed {
            candidates.push(input);
        }
        candidates.push(paths.sorted_compressed.as_path());
        if !compressed {
            candidates.push(paths.compressed.as_path());
        }

        candidates
            .into_iter()
            .filter(|candidate| candidate.exists())
            .filter(|candidate| *candidate == input || !is_older(candidate, input))
            .find(|candidate| !checker.needs_rebuild(candidate, &[Sidecar::Tbi]))
            .map(Path::to_path_buf)
    }

    fn compress_and_index(&self, source: &Path, target: &Path) -> std::result::Result<(), ToolError> {
        if source != target {
            self.tool.compress(source, target)?;
        }
        self.tool.tabix(target, TabixPreset::Gff)
    }

    /// Write the records of `input` to `output` ordered by chromosome, start
    /// and descending end. Comment lines are kept, ahead of the records.
    fn sort_records(&self, input: &Path, output: &Path) -> Result<()> {
        info!(path = %input.display(), "sorting annotation file");

        let (reader, _) = open_text(input)
            .map_err(|e| Error::format(input, format!("failed to open annotation file: {e}")))?;

        let mut comments = Vec::new();
        let mut records: Vec<Interval> = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|e| Error::format(input, format!("failed to read annotation file: {e}")))?;

            if line.starts_with('#') {
                comments.push(line);
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_record(&line)
                .map_err(|message| Error::format(input, format!("line {}: {message}", number + 1)))?;
            records.push(record);
        }

        records.sort_by(Interval::record_order);

        let write_error =
            |e: std::io::Error| Error::format(output, format!("failed to write sorted file: {e}"));
        let mut staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".sorting")
            .tempfile_in(parent_dir(output))
            .map_err(write_error)?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            let records = records.iter().filter_map(Interval::raw_line);
            for line in comments.iter().map(String::as_str).chain(records) {
                writeln!(writer, "{line}").map_err(write_error)?;
            }
            writer.flush().map_err(write_error)?;
        }

        staged.persist(output).map_err(|e| write_error(e.error))?;
        Ok(())
    }
}
