//! Pre-release identifiers for semantic versioning
//!
//! A pre-release is the dot-separated list after the `-` in `v1.0.0-beta.11`.
//! Precedence follows SemVer 2.0, item 11.

use crate::error::{BumpError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A single dot-separated pre-release identifier
///
/// Both variants keep the text exactly as written, so a tag renders back to the
/// string it was parsed from.
#[derive(Debug, Clone)]
pub enum Identifier {
    /// Identifier made only of ASCII digits, compared numerically at any length
    Numeric(String),
    /// Any other identifier, compared by ASCII order
    AlphaNumeric(String),
}

impl Identifier {
    /// Parse one identifier
    ///
    /// Identifiers must be non-empty and drawn from `[0-9A-Za-z-]`. All-digit identifiers
    /// become [`Identifier::Numeric`]; leading zeros are accepted and do not affect the value.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Whether this identifier is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, Identifier::Numeric(_))
    }

    /// The identifier as written
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Numeric(s) | Identifier::AlphaNumeric(s) => s,
        }
    }
}

/// Digits of a numeric identifier without leading zeros; `""` for zero
fn significant(digits: &str) -> &str {
    digits.trim_start_matches('0')
}

impl FromStr for Identifier {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(BumpError::InvalidSuffix(s.to_string()));
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(BumpError::InvalidSuffix(s.to_string()));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Identifier::Numeric(s.to_string()));
        }

        Ok(Identifier::AlphaNumeric(s.to_string()))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => {
                let (a, b) = (significant(a), significant(b));
                // without leading zeros, more digits means a larger number
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            // numeric identifiers always have lower precedence than alphanumeric ones
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => {
                a.as_bytes().cmp(b.as_bytes())
            }
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Identifier::Numeric(digits) => {
                0u8.hash(state);
                significant(digits).hash(state);
            }
            Identifier::AlphaNumeric(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of pre-release identifiers
///
/// An empty list means a stable release. Ordering here only covers the identifier
/// chain; the "stable outranks pre-release" rule lives in [`crate::domain::Version`].
///
/// # Examples
/// - "" -> PreRelease { identifiers: [] }
/// - "beta.11" -> PreRelease { identifiers: [AlphaNumeric("beta"), Numeric("11")] }
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PreRelease {
    identifiers: Vec<Identifier>,
}

impl PreRelease {
    /// The empty pre-release of a stable version
    pub fn empty() -> Self {
        PreRelease::default()
    }

    /// Build a pre-release from already parsed identifiers
    pub fn new(identifiers: Vec<Identifier>) -> Self {
        PreRelease { identifiers }
    }

    /// Parse a dot-separated identifier list without its leading dash
    ///
    /// An empty string yields the empty pre-release. Any empty segment
    /// (`"alpha..1"`, `"alpha."`) is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(PreRelease::empty());
        }

        let identifiers = s
            .split('.')
            .map(|part| {
                Identifier::parse(part).map_err(|e| match e {
                    BumpError::InvalidSuffix(_) => BumpError::InvalidSuffix(s.to_string()),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PreRelease { identifiers })
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }
}

impl Ord for PreRelease {
    /// Identifier-by-identifier comparison; on a shared prefix the longer chain wins.
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.identifiers.iter().zip(other.identifiers.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }
        self.identifiers.len().cmp(&other.identifiers.len())
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, identifier) in self.identifiers.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", identifier)?;
        }
        Ok(())
    }
}

impl FromStr for PreRelease {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        PreRelease::parse(s)
    }
}
