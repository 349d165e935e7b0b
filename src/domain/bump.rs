use crate::domain::prerelease::PreRelease;
use crate::domain::version::Version;
use crate::error::{BumpError, Result};
use std::fmt;
use std::str::FromStr;

/// Which version component to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl FromStr for BumpKind {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(BumpError::InvalidBumpKind(other.to_string())),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn increment(value: u64, name: &str) -> Result<u64> {
    value
        .checked_add(1)
        .ok_or_else(|| BumpError::VersionOverflow(format!("{} component {} cannot be incremented", name, value)))
}

/// Computes the next version from `current`.
///
/// - **Major**: major += 1, minor = 0, patch = 0
/// - **Minor**: minor += 1, patch = 0
/// - **Patch**: patch += 1
///
/// The pre-release of the result comes only from `suffix`: `None` or `Some("")` gives
/// a stable version, anything else is parsed as a dot-separated identifier list and
/// rendered exactly as given. The current version's pre-release is never carried over.
///
/// # Example
/// ```
/// use git_bump::domain::{bump, BumpKind, Version};
///
/// let current = Version::parse("v0.1.1").unwrap();
/// let next = bump(&current, BumpKind::Major, Some("rc1")).unwrap();
/// assert_eq!(next.to_string(), "v1.0.0-rc1");
/// ```
pub fn bump(current: &Version, kind: BumpKind, suffix: Option<&str>) -> Result<Version> {
    let (major, minor, patch) = match kind {
        BumpKind::Major => (increment(current.major, "major")?, 0, 0),
        BumpKind::Minor => (current.major, increment(current.minor, "minor")?, 0),
        BumpKind::Patch => (current.major, current.minor, increment(current.patch, "patch")?),
    };

    let pre = PreRelease::parse(suffix.unwrap_or_default())?;

    Ok(Version::with_pre(major, minor, patch, pre))
}

impl Version {
    /// Method form of [`bump`]
    pub fn bump(&self, kind: BumpKind, suffix: Option<&str>) -> Result<Version> {
        bump(self, kind, suffix)
    }
}

/// Computes the next tag string from raw strings, as supplied on a command line.
///
/// # Errors
/// * `UnparseableCurrentVersion` - if `current_tag` is not a version tag
/// * `InvalidBumpKind` - if `kind` is not major, minor or patch
/// * `InvalidSuffix` - if `suffix` is not a valid identifier list
pub fn next_tag(current_tag: &str, kind: &str, suffix: &str) -> Result<String> {
    let current =
        Version::parse(current_tag).map_err(|_| BumpError::UnparseableCurrentVersion {
            tag: current_tag.to_string(),
        })?;
    let kind: BumpKind = kind.parse()?;

    Ok(bump(&current, kind, Some(suffix))?.render())
}
