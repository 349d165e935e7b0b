//! Semantic version tagging for git repositories.
//!
//! [domain] holds the pure version logic, [git] the repository gateway, and
//! [cli] the bump workflow that ties them together.

pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod ui;
pub mod version_file;

pub use error::{BumpError, Result};
