//! Git operations abstraction layer
//!
//! The version logic in [`crate::domain`] only needs a snapshot of tag names and a
//! place to create the chosen tag. This module supplies both behind the
//! [Repository] trait:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! Mutating operations on a real repository are serialized by a
//! [lock::RepoLock] owned by that repository handle.
//!
//! ```no_run
//! # use git_bump::git::{Git2Repository, Repository};
//! # use git_bump::config::LockConfig;
//! # fn example() -> git_bump::Result<()> {
//! let repo = Git2Repository::discover(".", LockConfig::default())?;
//! let latest = git_bump::domain::select_latest(repo.list_tags()?);
//! # Ok(())
//! # }
//! ```

pub mod lock;
pub mod mock;
pub mod repository;

pub use lock::RepoLock;
pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::Path;

/// Common git operation trait for abstraction
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` so a handle can be shared across threads.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map underlying
/// errors (like `git2::Error`) to the appropriate [crate::error::BumpError] variants.
pub trait Repository: Send + Sync {
    /// Root of the working tree
    fn path(&self) -> &Path;

    /// Get all tag names in the repository, in no particular order
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Create an annotated tag on HEAD whose message is the tag name
    ///
    /// Fails if the tag already exists.
    fn create_tag(&self, name: &str) -> Result<()>;

    /// List the tags, let `choose` name the next tag from that snapshot, and create it
    ///
    /// The repository stays locked from the listing until the tag exists, so two
    /// concurrent runs cannot pick the same name from stale snapshots.
    ///
    /// # Returns
    /// * `Ok(name)` - The tag returned by `choose`, now created on HEAD
    /// * `Err` - If `choose` fails (nothing is created) or the tag cannot be created
    fn create_tag_from_snapshot(
        &self,
        choose: &mut dyn FnMut(&[String]) -> Result<String>,
    ) -> Result<String>;

    /// Push a single tag to a remote
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// Push every local tag to a remote
    fn push_tags(&self, remote: &str) -> Result<()>;

    /// Stage one file (relative to [Repository::path]) and commit it on HEAD
    fn commit_file(&self, relative_path: &Path, message: &str) -> Result<()>;

    /// Read the repository's `bump.defaultPush` preference
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Preference explicitly set to `true` or `false`
    /// * `Ok(None)` - Preference not set
    /// * `Err` - Preference set to something other than `true`/`false`, or config unreadable
    fn push_preference(&self) -> Result<Option<bool>>;

    /// Store the repository's `bump.defaultPush` preference
    fn set_push_preference(&self, value: bool) -> Result<()>;
}

/// Parse a `bump.defaultPush` value; only `true` and `false` are accepted
pub fn parse_push_preference(value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(crate::error::BumpError::config(format!(
            "invalid bump.defaultPush value: {} (must be 'true' or 'false')",
            other
        ))),
    }
}
