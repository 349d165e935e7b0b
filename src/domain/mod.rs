//! Domain logic - pure version rules independent of git operations
//!
//! Everything here is synchronous and free of shared state: parse a tag, compare two
//! versions, pick the latest of a snapshot of tags, compute the next version.

pub mod bump;
pub mod prerelease;
pub mod select;
pub mod version;

pub use bump::{bump, next_tag, BumpKind};
pub use prerelease::{Identifier, PreRelease};
pub use select::{select_latest, sort_descending, sorted_versions};
pub use version::{compare, Version};

/// Parse a tag string into a [`Version`]
pub fn parse(tag: &str) -> crate::error::Result<Version> {
    Version::parse(tag)
}
