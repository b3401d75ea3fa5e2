use crate::interval::{Interval, Strand};
use crate::{Error, Result};
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// GTF column 9: `key "value";` pairs.
static ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+ "[\w.\s\-%,:]+";? ?)+"#).expect("attribute pattern is valid")
});

/// Outcome of peeking at an annotation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniff {
    pub is_annotation: bool,
    pub is_compressed: bool,
}

/// Check the gzip magic bytes. BGZF files are gzip files too.
pub fn is_gzip(path: &Path) -> io::Result<bool> {
    let mut magic = [0u8; 2];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open a text file, transparently decompressing gzip/BGZF input.
pub fn open_text(path: &Path) -> io::Result<(Box<dyn BufRead>, bool)> {
    let compressed = is_gzip(path)?;
    let file = File::open(path)?;

    let reader: Box<dyn BufRead> = if compressed {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok((reader, compressed))
}

/// Decide whether `path` is a GTF-style annotation file by looking at its
/// first data line.
pub fn sniff(path: &Path) -> Result<Sniff> {
    let (reader, is_compressed) = open_text(path)
        .map_err(|e| Error::format(path, format!("failed to open annotation file: {e}")))?;

    let mut is_annotation = false;
    for line in reader.lines() {
        let line =
            line.map_err(|e| Error::format(path, format!("failed to read annotation file: {e}")))?;
        if line.starts_with('#') {
            continue;
        }
        is_annotation = is_annotation_line(&line);
        break;
    }

    Ok(Sniff {
        is_annotation,
        is_compressed,
    })
}

fn is_annotation_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return false;
    }

    let attributes = fields[8..].join(" ");
    ATTRIBUTES.is_match(&attributes)
}

/// Parse the coordinates of an annotation record (columns 1, 4, 5 and 7),
/// keeping the line itself as payload.
pub fn parse_record(line: &str) -> std::result::Result<Interval, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 7 {
        return Err(format!("expected at least 7 columns, found {}", fields.len()));
    }

    let start = fields[3]
        .parse()
        .map_err(|_| format!("invalid start {:?}", fields[3]))?;
    let end = fields[4]
        .parse()
        .map_err(|_| format!("invalid end {:?}", fields[4]))?;
    let strand = fields[6]
        .parse::<Strand>()
        .map_err(|e| e.to_string())?;

    Interval::new(fields[0], start, end, strand)
        .map(|interval| interval.with_raw_line(line))
        .map_err(|e| e.to_string())
}
