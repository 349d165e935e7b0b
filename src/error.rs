use thiserror::Error;

/// Grammar every version tag must match, quoted in parse errors.
pub const TAG_GRAMMAR: &str = "vMAJOR.MINOR.PATCH[-PRERELEASE]";

/// Unified error type for git-bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("Invalid version tag '{tag}': expected {}", TAG_GRAMMAR)]
    Parse { tag: String },

    #[error("Invalid bump kind '{0}': expected one of major, minor, patch")]
    InvalidBumpKind(String),

    #[error("Cannot bump '{tag}': not a version tag of the form {}", TAG_GRAMMAR)]
    UnparseableCurrentVersion { tag: String },

    #[error("Invalid pre-release suffix '{0}': expected dot-separated [0-9A-Za-z-] identifiers")]
    InvalidSuffix(String),

    #[error("Version overflow: {0}")]
    VersionOverflow(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Repository lock error: {0}")]
    Lock(String),

    #[error("Version file error: {0}")]
    VersionFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-bump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create a parse error for the offending tag
    pub fn parse(tag: impl Into<String>) -> Self {
        BumpError::Parse { tag: tag.into() }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        BumpError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        BumpError::Remote(msg.into())
    }

    /// Create a lock error with context
    pub fn lock(msg: impl Into<String>) -> Self {
        BumpError::Lock(msg.into())
    }

    /// Create a version file error with context
    pub fn version_file(msg: impl Into<String>) -> Self {
        BumpError::VersionFile(msg.into())
    }
}
