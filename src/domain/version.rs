use crate::domain::prerelease::PreRelease;
use crate::error::{BumpError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Full-string tag grammar: `v<digits>.<digits>.<digits>(-<identifiers>)?`
const TAG_PATTERN: &str = r"^v([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$";

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TAG_PATTERN).expect("tag pattern is a valid regex"))
}

/// Semantic version parsed from a `v`-prefixed tag
///
/// Equality, hashing and ordering look only at `(major, minor, patch, pre)`;
/// `source_tag` is carried along for output.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: PreRelease,
    source_tag: String,
}

impl Version {
    /// Create a stable version; its source tag is the canonical rendering
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version::with_pre(major, minor, patch, PreRelease::empty())
    }

    /// Create a version with a pre-release; its source tag is the canonical rendering
    pub fn with_pre(major: u64, minor: u64, patch: u64, pre: PreRelease) -> Self {
        let mut version = Version {
            major,
            minor,
            patch,
            pre,
            source_tag: String::new(),
        };
        version.source_tag = version.render();
        version
    }

    /// Parse a tag string (e.g., "v1.2.3-beta.11")
    ///
    /// The whole string must match the tag grammar: no surrounding whitespace, no
    /// missing `v`, no build metadata.
    ///
    /// # Returns
    /// * `Ok(Version)` - Parsed version remembering `tag` as its source
    /// * `Err(BumpError::Parse)` - If the string does not match the grammar
    /// * `Err(BumpError::VersionOverflow)` - If major, minor or patch does not fit in `u64`
    pub fn parse(tag: &str) -> Result<Self> {
        let captures = tag_regex()
            .captures(tag)
            .ok_or_else(|| BumpError::parse(tag))?;

        let component = |index: usize, name: &str| -> Result<u64> {
            let digits = &captures[index];
            digits.parse::<u64>().map_err(|_| {
                BumpError::VersionOverflow(format!("{} component {} in '{}'", name, digits, tag))
            })
        };

        let major = component(1, "major")?;
        let minor = component(2, "minor")?;
        let patch = component(3, "patch")?;

        let pre = match captures.get(4) {
            Some(m) => PreRelease::parse(m.as_str())?,
            None => PreRelease::empty(),
        };

        Ok(Version {
            major,
            minor,
            patch,
            pre,
            source_tag: tag.to_string(),
        })
    }

    /// The tag string this version was parsed from
    pub fn source_tag(&self) -> &str {
        &self.source_tag
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Canonical tag rendering: `v{major}.{minor}.{patch}[-{pre}]`
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Version string without the `v` prefix and pre-release, e.g. "1.2.3"
    pub fn core(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compare two versions by SemVer 2.0 precedence
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // a stable release outranks any pre-release of the same core
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
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

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.pre.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}
