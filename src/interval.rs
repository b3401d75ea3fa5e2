//! Genomic intervals used to order annotation records.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::{Error, Result};

/// Strand of a genomic feature. `.` in annotation files is read as [`Strand::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl FromStr for Strand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Self::Forward),
            "-" => Ok(Self::Reverse),
            "*" | "." => Ok(Self::Unknown),
            other => Err(Error::Construction(format!(
                "strand should be +, - or *, not {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
            Self::Unknown => write!(f, "*"),
        }
    }
}

/// An immutable closed range on a chromosome.
///
/// Equality and hashing only look at `(chromosome, start, end)`; the strand and
/// the raw line payload are ignored.
#[derive(Debug, Clone)]
pub struct Interval {
    chromosome: String,
    start: u64,
    end: u64,
    strand: Strand,
    raw_line: Option<String>,
}

impl Interval {
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64, strand: Strand) -> Result<Self> {
        if end < start {
            return Err(Error::Construction(format!(
                "end should not be smaller than start, got {start} -> {end}"
            )));
        }

        Ok(Self {
            chromosome: chromosome.into(),
            start,
            end,
            strand,
            raw_line: None,
        })
    }

    /// Attach the source line this interval was read from.
    #[must_use]
    pub fn with_raw_line(mut self, line: impl Into<String>) -> Self {
        self.raw_line = Some(line.into());
        self
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn raw_line(&self) -> Option<&str> {
        self.raw_line.as_deref()
    }

    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    /// Whether `self` sorts upstream of `other`.
    ///
    /// At equal chromosome and start the wider interval comes first, so a
    /// transcript is placed ahead of its exons.
    pub fn precedes(&self, other: &Self) -> bool {
        if self.chromosome != other.chromosome {
            return self.chromosome < other.chromosome;
        }

        if self.start != other.start {
            return self.start < other.start;
        }

        self.end > other.end
    }

    /// Whether `self` sorts downstream of `other`.
    ///
    /// Not the inverse of [`Interval::precedes`]: at equal chromosome and start
    /// the narrower interval counts as earlier, so the wider one follows it
    /// even though it also precedes it.
    pub fn follows(&self, other: &Self) -> bool {
        if self.chromosome != other.chromosome {
            return self.chromosome > other.chromosome;
        }

        if self.start != other.start {
            return self.start > other.start;
        }

        self.end > other.end
    }

    /// Record order used when sorting annotation files: chromosome, start,
    /// then wider intervals first.
    pub fn record_order(&self, other: &Self) -> Ordering {
        if self.precedes(other) {
            Ordering::Less
        } else if other.precedes(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.chromosome == other.chromosome && self.start <= other.end && self.end >= other.start
    }

    /// Span both intervals on `self`'s chromosome and strand. Callers are
    /// expected to merge same-chromosome intervals only.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            chromosome: self.chromosome.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            strand: self.strand,
            raw_line: None,
        }
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.chromosome == other.chromosome && self.start == other.start && self.end == other.end
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chromosome.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.chromosome, self.start, self.end, self.strand)
    }
}

impl FromStr for Interval {
    type Err = Error;

    /// Parse `chr1:1-100` or `chr1:1-100:+`.
    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();

        let (chromosome, sites, strand) = match fields.as_slice() {
            [chromosome, sites] => (*chromosome, *sites, Strand::Unknown),
            [chromosome, sites, strand] => (
                *chromosome,
                *sites,
                strand.parse().map_err(|_| Error::Parse(s.to_string()))?,
            ),
            _ => return Err(Error::Parse(s.to_string())),
        };

        let (start, end) = sites
            .split_once('-')
            .ok_or_else(|| Error::Parse(s.to_string()))?;
        let start = start.parse().map_err(|_| Error::Parse(s.to_string()))?;
        let end = end.parse().map_err(|_| Error::Parse(s.to_string()))?;

        Self::new(chromosome, start, end, strand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loci(chromosome: &str, start: u64, end: u64) -> Interval {
        Interval::new(chromosome, start, end, Strand::Forward).unwrap()
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = Interval::new("chr1", 10, 5, Strand::Forward).unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
    }

    #[test]
    fn test_strand_normalization() {
        assert_eq!(".".parse::<Strand>().unwrap(), Strand::Unknown);
        assert!(matches!("x".parse::<Strand>(), Err(Error::Construction(_))));
    }

    #[test]
    fn test_precedes_puts_wider_interval_first() {
        let transcript = loci("chr1", 100, 500);
        let exon = loci("chr1", 100, 200);
        assert!(transcript.precedes(&exon));
        assert!(!exon.precedes(&transcript));
    }

    #[test]
    fn test_follows_puts_narrower_interval_first() {
        let transcript = loci("chr1", 100, 500);
        let exon = loci("chr1", 100, 200);
        assert!(transcript.follows(&exon));
        assert!(!exon.follows(&transcript));
        // Both relations hold for the same pair at equal chromosome and start.
        assert!(transcript.precedes(&exon) && transcript.follows(&exon));
    }

    #[test]
    fn test_follows_is_not_the_inverse_of_precedes() {
        let wide = loci("chr3", 10, 90);
        let narrow = loci("chr3", 10, 20);
        assert_eq!(wide.precedes(&narrow), wide.follows(&narrow));
        assert_eq!(narrow.precedes(&wide), narrow.follows(&wide));
        // identical spans neither precede nor follow each other
        assert!(!wide.follows(&loci("chr3", 10, 90)));
    }

    #[test]
    fn test_precedes_chromosome_then_start() {
        assert!(loci("chr1", 900, 1000).precedes(&loci("chr2", 1, 2)));
        assert!(loci("chr1", 1, 1000).precedes(&loci("chr1", 2, 3)));
        assert!(loci("chr2", 1, 2).follows(&loci("chr1", 900, 1000)));
        assert!(loci("chr1", 2, 3).follows(&loci("chr1", 1, 1000)));
    }

    #[test]
    fn test_record_order_sorts_parent_before_child() {
        let mut records = vec![
            loci("chr2", 5, 10),
            loci("chr1", 100, 200),
            loci("chr1", 100, 500),
            loci("chr1", 50, 60),
        ];
        records.sort_by(Interval::record_order);
        let order: Vec<String> = records.iter().map(ToString::to_string).collect();
        assert_eq!(
            order,
            ["chr1:50-60:+", "chr1:100-500:+", "chr1:100-200:+", "chr2:5-10:+"]
        );
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let pairs = [
            (loci("chr1", 1, 10), loci("chr1", 10, 20)),
            (loci("chr1", 1, 10), loci("chr1", 11, 20)),
            (loci("chr1", 1, 100), loci("chr1", 40, 50)),
            (loci("chr1", 1, 10), loci("chr2", 1, 10)),
        ];
        for (a, b) in &pairs {
            assert_eq!(a.overlaps(b), b.overlaps(a), "{a} vs {b}");
        }
        assert!(pairs[0].0.overlaps(&pairs[0].1));
        assert!(!pairs[1].0.overlaps(&pairs[1].1));
        assert!(!pairs[3].0.overlaps(&pairs[3].1));
    }

    #[test]
    fn test_merge_spans_both() {
        let a = Interval::new("chr1", 50, 80, Strand::Reverse).unwrap();
        let b = loci("chr1", 10, 60);
        let merged = a.merge(&b);
        assert_eq!(merged.start(), 10);
        assert_eq!(merged.end(), 80);
        assert_eq!(merged.strand(), Strand::Reverse);
        assert_eq!(merged.length(), 70);
    }

    #[test]
    fn test_equality_ignores_strand_and_payload() {
        let a = Interval::new("chr1", 1, 5, Strand::Forward)
            .unwrap()
            .with_raw_line("chr1\tsrc\texon\t1\t5");
        let b = Interval::new("chr1", 1, 5, Strand::Reverse).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_round_trip() {
        for literal in ["chr1:1-100:+", "chrX:0-0:-", "scaffold_12:5-9:*"] {
            let interval: Interval = literal.parse().unwrap();
            assert_eq!(interval.to_string(), literal);
            let again: Interval = interval.to_string().parse().unwrap();
            assert_eq!(again, interval);
            assert_eq!(again.strand(), interval.strand());
        }
    }

    #[test]
    fn test_parse_defaults_and_normalizes_strand() {
        let interval: Interval = "chr1:1-100".parse().unwrap();
        assert_eq!(interval.strand(), Strand::Unknown);

        let dotted: Interval = "chr1:1-100:.".parse().unwrap();
        assert_eq!(dotted.to_string(), "chr1:1-100:*");
    }

    #[test]
    fn test_parse_rejects_bad_literals() {
        assert!(matches!("chr1".parse::<Interval>(), Err(Error::Parse(_))));
        assert!(matches!("a:1-2:+:x".parse::<Interval>(), Err(Error::Parse(_))));
        assert!(matches!("chr1:1_100".parse::<Interval>(), Err(Error::Parse(_))));
        assert!(matches!("chr1:a-100".parse::<Interval>(), Err(Error::Parse(_))));
        assert!(matches!(
            "chr1:100-1".parse::<Interval>(),
            Err(Error::Construction(_))
        ));
    }
}
