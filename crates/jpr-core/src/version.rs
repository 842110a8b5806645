//! Plugin version ordering
//!
//! Jenkins plugins mostly use dotted numeric versions (`2.6.3`, `1.0-beta-1`),
//! which [`Version`] parses. Plugins released through continuous delivery use
//! `<build>.v<commit>` instead (`1108.v57edf648f5d4`), which no dotted scheme
//! can order. [`VersionOrdering`] tries the dotted scheme first and then a
//! table of fallback schemes built when the ordering is constructed.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{Error, Result};

static DOTTED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^v?(?P<release>[0-9]+(?:\.[0-9]+)*?)",
        r"(?:-(?P<numeric_pre>[0-9]+[0-9A-Za-z\-~]*(?:\.[0-9A-Za-z\-~]+)*)",
        r"|-?(?P<named_pre>[A-Za-z\-~]+[0-9A-Za-z\-~]*(?:\.[0-9A-Za-z\-~]+)*))?",
        r"(?:\+(?P<build>[0-9A-Za-z\-~]+(?:\.[0-9A-Za-z\-~]+)*))?$",
    ))
    .unwrap()
});

static CONTINUOUS_DELIVERY_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>\d+(?:\.\d+)*)\.v(?P<commit>[0-9A-Za-z_]+)$").unwrap()
});

/// A dotted numeric version with an optional prerelease tag.
///
/// Release segments compare numerically, with missing trailing segments
/// treated as zero. A version with a prerelease tag sorts below the same
/// release without one. Build metadata after `+` is ignored.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    prerelease: Option<String>,
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        let captures = DOTTED_VERSION
            .captures(s)
            .ok_or_else(|| invalid("not a dotted numeric version"))?;

        let release = captures["release"]
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| invalid("release segment out of range"))
            })
            .collect::<Result<Vec<_>>>()?;

        let prerelease = captures
            .name("numeric_pre")
            .or_else(|| captures.name("named_pre"))
            .map(|m| m.as_str().to_string());

        Ok(Self {
            release,
            prerelease,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.release.len().max(other.release.len());
        for i in 0..width {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

/// Dot-separated identifiers: numeric ones compare as numbers and sort
/// below alphanumeric ones, which compare lexically. A tag that is a prefix
/// of the other sorts first.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// A version syntax the dotted scheme cannot handle.
struct FallbackScheme {
    name: &'static str,
    pattern: &'static Regex,
    lower: fn(&Captures<'_>, &Captures<'_>) -> Result<bool>,
}

/// `<build>.v<commit>` versions: the numeric prefix decides.
///
/// Prefixes with the same number of components compare as dotted versions;
/// otherwise the one with fewer components is lower.
fn continuous_delivery_lower(a: &Captures<'_>, b: &Captures<'_>) -> Result<bool> {
    let (prefix_a, prefix_b) = (&a["prefix"], &b["prefix"]);
    let width_a = prefix_a.split('.').count();
    let width_b = prefix_b.split('.').count();
    if width_a != width_b {
        return Ok(width_a < width_b);
    }
    Ok(prefix_a.parse::<Version>()? < prefix_b.parse::<Version>()?)
}

/// Total order policy over plugin version strings.
///
/// The empty string stands for "no version yet" and is older than any
/// non-empty version.
pub struct VersionOrdering {
    fallbacks: Vec<FallbackScheme>,
}

impl Default for VersionOrdering {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VersionOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionOrdering")
            .field(
                "fallbacks",
                &self.fallbacks.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl VersionOrdering {
    pub fn new() -> Self {
        Self {
            fallbacks: vec![FallbackScheme {
                name: "continuous-delivery",
                pattern: &CONTINUOUS_DELIVERY_VERSION,
                lower: continuous_delivery_lower,
            }],
        }
    }

    /// Whether `candidate` is strictly older than `incumbent`.
    pub fn lower(&self, candidate: &str, incumbent: &str) -> Result<bool> {
        if candidate.is_empty() || incumbent.is_empty() {
            return Ok(candidate.is_empty() && !incumbent.is_empty());
        }

        let dotted_candidate = candidate.parse::<Version>();
        let dotted_incumbent = incumbent.parse::<Version>();
        if let (Ok(a), Ok(b)) = (&dotted_candidate, &dotted_incumbent) {
            return Ok(a < b);
        }

        let mut failures: Vec<String> = [&dotted_candidate, &dotted_incumbent]
            .into_iter()
            .filter_map(|parsed| parsed.as_ref().err().map(Error::to_string))
            .collect();

        for scheme in &self.fallbacks {
            match (
                scheme.pattern.captures(candidate),
                scheme.pattern.captures(incumbent),
            ) {
                (Some(a), Some(b)) => return (scheme.lower)(&a, &b),
                // A dotted version predates the switch to the fallback scheme.
                (Some(_), None) if dotted_incumbent.is_ok() => return Ok(false),
                (None, Some(_)) if dotted_candidate.is_ok() => return Ok(true),
                _ => failures.push(format!("not both {} versions", scheme.name)),
            }
        }

        Err(Error::VersionComparison {
            candidate: candidate.to_string(),
            incumbent: incumbent.to_string(),
            failures,
        })
    }
}
