//! Picking the latest version out of a repository's tag names

use crate::domain::version::Version;
use tracing::debug;

/// Parses every tag, silently skipping the ones that are not version tags.
fn parse_all<I, S>(tags: I) -> impl Iterator<Item = Version>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter().filter_map(|tag| {
        let tag = tag.as_ref();
        match Version::parse(tag) {
            Ok(version) => Some(version),
            Err(e) => {
                debug!(tag, reason = %e, "skipping non-version tag");
                None
            }
        }
    })
}

/// Returns the highest version among `tags`, or `None` when no tag parses.
///
/// Tags that are structurally identical (e.g. `v1.0.0-rc.1` and `v1.0.0-rc.01`)
/// resolve to the first one seen.
///
/// # Example
/// ```
/// use git_bump::domain::select_latest;
///
/// let latest = select_latest(["release", "v1.0.0", "v1.0.0-rc.1"]).unwrap();
/// assert_eq!(latest.source_tag(), "v1.0.0");
/// assert!(select_latest(Vec::<String>::new()).is_none());
/// ```
pub fn select_latest<I, S>(tags: I) -> Option<Version>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_all(tags).fold(None, |best: Option<Version>, candidate| match best {
        Some(current) if candidate <= current => Some(current),
        _ => Some(candidate),
    })
}

/// Returns every version tag among `tags`, newest first.
///
/// The sort is stable, so structurally identical versions keep their input order.
pub fn sorted_versions<I, S>(tags: I) -> Vec<Version>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut versions: Vec<Version> = parse_all(tags).collect();
    sort_descending(&mut versions);
    versions
}

/// Sorts versions newest first
pub fn sort_descending(versions: &mut [Version]) {
    versions.sort_by(|a, b| b.cmp(a));
}
