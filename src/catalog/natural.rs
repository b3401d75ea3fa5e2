//! Presentation order for replicate and timepoint files.
//!
//! File names such as `S1_3D.bam` (sample 1, day 3) or `S2_5.bam` (sample 2,
//! month 5) are decoded into numeric keys. Names that do not follow the
//! convention still get a deterministic key so listing never fails.

use regex::Regex;
use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// Secondary key for names without a timepoint; sorts after dated files.
pub const UNDATED: i64 = 100_000;

const DAY_SCALE: i64 = 1;
const MONTH_SCALE: i64 = 30;

static DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+D").expect("day pattern is valid"));

#[derive(Debug, Clone)]
pub enum NaturalKey {
    Parsed {
        primary: i64,
        secondary: i64,
        /// Trailing `_`-separated integers, compared after `secondary`.
        rest: Vec<i64>,
    },
    Fallback {
        hash: i64,
    },
}

impl NaturalKey {
    pub fn decode(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| NaturalKey::Fallback {
            hash: stable_hash(name),
        })
    }

    fn parse(name: &str) -> Option<Self> {
        let mut segments = name.split('_');

        let primary = digits(segments.next()?)?;

        let secondary = match segments.next() {
            Some(segment) => {
                let scale = if DAYS.is_match(segment) {
                    DAY_SCALE
                } else {
                    MONTH_SCALE
                };
                digits(segment)?.checked_mul(scale)?
            }
            None => UNDATED,
        };

        let rest = segments
            .map(|segment| segment.parse().ok())
            .collect::<Option<Vec<i64>>>()?;

        Some(NaturalKey::Parsed {
            primary,
            secondary,
            rest,
        })
    }

    pub fn primary(&self) -> i64 {
        match self {
            NaturalKey::Parsed { primary, .. } => *primary,
            NaturalKey::Fallback { hash } => *hash,
        }
    }

    pub fn secondary(&self) -> i64 {
        match self {
            NaturalKey::Parsed { secondary, .. } => *secondary,
            NaturalKey::Fallback { .. } => UNDATED,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, NaturalKey::Fallback { .. })
    }

    fn components(&self) -> impl Iterator<Item = i64> + '_ {
        let rest: &[i64] = match self {
            NaturalKey::Parsed { rest, .. } => rest.as_slice(),
            NaturalKey::Fallback { .. } => &[],
        };
        [self.primary(), self.secondary()]
            .into_iter()
            .chain(rest.iter().copied())
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(other.components())
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NaturalKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NaturalKey {}

/// Every ASCII digit of `segment`, read as one number.
fn digits(segment: &str) -> Option<i64> {
    let digits: String = segment.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn stable_hash(name: &str) -> i64 {
    let mut hasher = FxHasher::default();
    name.hash(&mut hasher);
    hasher.finish() as i64
}

/// Sort file names into presentation order.
pub fn sort_names(names: &mut [String]) {
    names.sort_by_cached_key(|name| NaturalKey::decode(name));
}
