use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::{Error, Result};

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a single `bytes=` range against a file of `len` bytes.
///
/// Supports `a-b`, `a-` and the suffix form `-n`. The end is clamped to the
/// last byte of the file.
pub fn parse_range(value: &str, len: u64) -> Result<ByteRange> {
    let invalid = || Error::InvalidRange(value.to_string());

    let spec = value.trim().strip_prefix("bytes=").ok_or_else(invalid)?;
    if spec.contains(',') {
        return Err(Error::InvalidRange(format!("{value}: multiple ranges")));
    }
    let (start, end) = spec.split_once('-').ok_or_else(invalid)?;
    let (start, end) = (start.trim(), end.trim());

    let range = match (start.is_empty(), end.is_empty()) {
        (true, true) => return Err(invalid()),
        (true, false) => {
            let suffix: u64 = end.parse().map_err(|_| invalid())?;
            if suffix == 0 {
                return Err(invalid());
            }
            ByteRange {
                start: len.saturating_sub(suffix),
                end: len.saturating_sub(1),
            }
        }
        (false, _) => {
            let start: u64 = start.parse().map_err(|_| invalid())?;
            let end = if end.is_empty() {
                len.saturating_sub(1)
            } else {
                let end: u64 = end.parse().map_err(|_| invalid())?;
                end.min(len.saturating_sub(1))
            };
            if end < start {
                return Err(invalid());
            }
            ByteRange { start, end }
        }
    };

    if len == 0 || range.start >= len {
        return Err(Error::InvalidRange(format!("{value}: file has {len} bytes")));
    }
    Ok(range)
}

/// Content type served for a catalogued file or one of its indexes.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("bam") => "application/vnd.ga4gh.bam",
        Some("gz") => "application/gzip",
        Some("fa" | "fasta" | "fna") => "text/x-fasta",
        _ => "application/octet-stream",
    }
}

/// Stream a file from disk as an attachment, honouring a `Range` header.
pub async fn serve_file(path: &Path, content_type: &str, headers: &HeaderMap) -> Result<Response> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut file = fs::File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(name.clone()),
        _ => Error::Io(e),
    })?;
    let len = file.metadata().await?.len();

    let range = match headers.get(header::RANGE) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| Error::InvalidRange("non-ASCII Range header".to_string()))?;
            Some(parse_range(value, len)?)
        }
        None => None,
    };

    // Bodies are streamed from disk in chunks.
    let (status, length, body) = match range {
        Some(r) => {
            file.seek(SeekFrom::Start(r.start)).await?;
            let stream = ReaderStream::new(file.take(r.length()));
            (StatusCode::PARTIAL_CONTENT, r.length(), Body::from_stream(stream))
        }
        None => (StatusCode::OK, len, Body::from_stream(ReaderStream::new(file))),
    };

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, length)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_DISPOSITION, disposition);

    if let Some(r) = range {
        builder = builder.header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", r.start, r.end, len),
        );
    }

    builder
        .body(body)
        .map_err(|e| Error::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_range() {
        assert_eq!(
            parse_range("bytes=0-99", 1000).unwrap(),
            ByteRange { start: 0, end: 99 }
        );
    }

    #[test]
    fn test_parse_open_and_suffix_ranges() {
        assert_eq!(
            parse_range("bytes=900-", 1000).unwrap(),
            ByteRange { start: 900, end: 999 }
        );
        assert_eq!(
            parse_range("bytes=-100", 1000).unwrap(),
            ByteRange { start: 900, end: 999 }
        );
        assert_eq!(
            parse_range("bytes=-5000", 1000).unwrap(),
            ByteRange { start: 0, end: 999 }
        );
    }

    #[test]
    fn test_end_is_clamped() {
        assert_eq!(
            parse_range("bytes=10-5000", 100).unwrap(),
            ByteRange { start: 10, end: 99 }
        );
    }

    #[test]
    fn test_unsatisfiable_ranges() {
        assert!(matches!(parse_range("bytes=100-", 100), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("bytes=5-2", 100), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("bytes=0-1,5-6", 100), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("items=0-1", 100), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("bytes=-0", 100), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("S1.bam")), "application/vnd.ga4gh.bam");
        assert_eq!(content_type_for(Path::new("S1.bdg.gz")), "application/gzip");
        assert_eq!(content_type_for(Path::new("S1.bam.bai")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("S1.BAM")), "application/vnd.ga4gh.bam");
        assert_eq!(content_type_for(Path::new("genome.FA")), "text/x-fasta");
    }

    #[tokio::test]
    async fn test_serve_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S1.bam");
        std::fs::write(&path, b"0123456789").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=2-5"));

        let response = serve_file(&path, "application/vnd.ga4gh.bam", &headers)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
    }

    #[tokio::test]
    async fn test_serve_whole_file_streams_every_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S2.bam");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let response = serve_file(&path, "application/vnd.ga4gh.bam", &HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "200000");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), content.as_slice());
    }

    #[tokio::test]
    async fn test_serve_range_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S1.bam");
        std::fs::write(&path, b"0123456789").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=-3"));

        let response = serve_file(&path, "application/vnd.ga4gh.bam", &headers)
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"789");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = serve_file(&dir.path().join("gone.bam"), "", &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
