//! Rewrites a version constant in a source file to the next development version.
//!
//! After `v1.4.0` is tagged the file is moved on to `1.4.1-dev`, so builds from the
//! branch never report the released version. Supported declarations include:
//!
//! - `const Version = "1.3.1-dev"`
//! - `Version = "1.3.1-dev"` inside a const block
//! - `pub const VERSION: &str = "1.3.1-dev";`

use crate::config::VersionFileConfig;
use crate::domain::Version;
use crate::error::{BumpError, Result};
use crate::git::Repository;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Development version following `next`: `M.m.(p+1)-<suffix>`, without the `v`
pub fn dev_version(next: &Version, suffix: &str) -> Result<String> {
    let patch = next
        .patch
        .checked_add(1)
        .ok_or_else(|| BumpError::VersionOverflow(format!("patch of {}", next)))?;
    Ok(format!("{}.{}.{}-{}", next.major, next.minor, patch, suffix))
}

/// Checks a user supplied file path and returns it normalised relative to the repository root
///
/// # Returns
/// * `Ok(PathBuf)` - Relative path with `.` and `..` resolved
/// * `Err(BumpError::VersionFile)` - Empty, contains control characters, absolute, or
///   resolves outside the repository root
pub fn validate_file_path(file: &str) -> Result<PathBuf> {
    if file.trim().is_empty() {
        return Err(BumpError::version_file("file path is empty"));
    }

    if file.contains(['\0', '\r', '\n']) {
        return Err(BumpError::version_file(format!(
            "file path contains control characters: {:?}",
            file
        )));
    }

    let path = Path::new(file);
    if path.is_absolute() || path.has_root() {
        return Err(BumpError::version_file(format!(
            "file path must be relative to the repository root: {}",
            file
        )));
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(BumpError::version_file(format!(
                        "file path escapes the repository root: {}",
                        file
                    )));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(BumpError::version_file(format!(
                    "file path must be relative to the repository root: {}",
                    file
                )));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(BumpError::version_file(format!("file path names no file: {}", file)));
    }

    Ok(normalized)
}

fn constant_pattern(constant: &str) -> Result<Regex> {
    let pattern = format!(
        r#"(?m)^([ \t]*(?:pub(?:\([^)\n]*\))?[ \t]+)?(?:(?:const|static|var|let)[ \t]+)?{}\b[^=\n]*=[ \t]*)"[^"\n]*""#,
        regex::escape(constant)
    );
    Regex::new(&pattern)
        .map_err(|e| BumpError::version_file(format!("invalid constant name '{}': {}", constant, e)))
}

/// Replaces the string literal assigned to the first declaration of `constant`
pub fn rewrite_constant(source: &str, constant: &str, value: &str) -> Result<String> {
    let pattern = constant_pattern(constant)?;

    let caps = pattern.captures(source).ok_or_else(|| {
        BumpError::version_file(format!("version constant '{}' not found in file", constant))
    })?;
    let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
    let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    let mut rewritten = String::with_capacity(source.len() + value.len());
    rewritten.push_str(&source[..whole.start]);
    rewritten.push_str(prefix);
    rewritten.push('"');
    rewritten.push_str(value);
    rewritten.push('"');
    rewritten.push_str(&source[whole.end..]);
    Ok(rewritten)
}

/// Replace `path` with `contents` through a temporary file in the same directory
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(temp.path(), meta.permissions())?;
    }

    temp.persist(path).map_err(|e| BumpError::Io(e.error))?;
    Ok(())
}

/// Rewrite the version constant in `file` for the tag `next`, then commit it if configured
///
/// # Returns
/// * `Ok(String)` - The development version written to the file
pub fn update_version_file<R: Repository + ?Sized>(
    repo: &R,
    file: &str,
    next: &Version,
    config: &VersionFileConfig,
) -> Result<String> {
    let relative = validate_file_path(file)?;
    let absolute = repo.path().join(&relative);
    let dev = dev_version(next, &config.dev_suffix)?;

    let source = fs::read_to_string(&absolute).map_err(|e| {
        BumpError::version_file(format!("cannot read {}: {}", relative.display(), e))
    })?;
    let rewritten = rewrite_constant(&source, &config.constant, &dev)?;

    if rewritten == source {
        debug!(file = %relative.display(), version = %dev, "version file already up to date");
    } else {
        write_atomically(&absolute, &rewritten)?;
        info!(file = %relative.display(), version = %dev, "updated version file");
    }

    if config.commit {
        repo.commit_file(&relative, &format!("Bump version to {}", dev))?;
    }

    Ok(dev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use tempfile::TempDir;

    const GO_SOURCE: &str = r#"package main

import "fmt"

const Version = "1.0.0"

func main() {
	fmt.Println(Version)
}
"#;

    #[test]
    fn test_dev_version() {
        let next = Version::parse("v1.2.3").unwrap();
        assert_eq!(dev_version(&next, "dev").unwrap(), "1.2.4-dev");

        let next = Version::parse("v0.1.0-rc.1").unwrap();
        assert_eq!(dev_version(&next, "dev").unwrap(), "0.1.1-dev");

        let next = Version::new(1, 0, u64::MAX);
        assert!(matches!(dev_version(&next, "dev"), Err(BumpError::VersionOverflow(_))));
    }

    #[test]
    fn test_validate_file_path() {
        assert_eq!(validate_file_path("version.go").unwrap(), PathBuf::from("version.go"));
        assert_eq!(
            validate_file_path("./pkg/../cmd/version.go").unwrap(),
            PathBuf::from("cmd/version.go")
        );

        for bad in ["", "   ", "/etc/passwd", "../outside.go", "pkg/../../x.go", "a\nb", "a\0b", "."] {
            assert!(validate_file_path(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_rewrite_go_const() {
        let out = rewrite_constant(GO_SOURCE, "Version", "1.0.1-dev").unwrap();
        assert!(out.contains(r#"const Version = "1.0.1-dev""#));
        assert!(out.contains("fmt.Println(Version)"));
    }

    #[test]
    fn test_rewrite_const_block_first_match_only() {
        let source = "const (\n\tName    = \"tool\"\n\tVersion = \"0.1.0\"\n)\n\nvar Version2 = \"x\"\nconst Version = \"9.9.9\"\n";
        let out = rewrite_constant(source, "Version", "0.2.1-dev").unwrap();
        assert!(out.contains("\tVersion = \"0.2.1-dev\""));
        assert!(out.contains("const Version = \"9.9.9\""));
        assert!(out.contains("var Version2 = \"x\""));
    }

    #[test]
    fn test_rewrite_rust_const() {
        let source = "pub const VERSION: &str = \"1.0.0\";\n";
        let out = rewrite_constant(source, "VERSION", "1.0.1-dev").unwrap();
        assert_eq!(out, "pub const VERSION: &str = \"1.0.1-dev\";\n");
    }

    #[test]
    fn test_rewrite_missing_constant() {
        let err = rewrite_constant("package main\n", "Version", "1.0.1-dev").unwrap_err();
        assert!(matches!(err, BumpError::VersionFile(_)));
        // prefix of another identifier is not a match
        assert!(rewrite_constant("const VersionName = \"x\"\n", "Version", "1").is_err());
    }

    #[test]
    fn test_update_version_file_commits() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("version.go"), GO_SOURCE).unwrap();
        let repo = MockRepository::new(dir.path());
        let next = Version::parse("v1.1.0").unwrap();

        let dev = update_version_file(&repo, "version.go", &next, &VersionFileConfig::default())
            .unwrap();

        assert_eq!(dev, "1.1.1-dev");
        let written = fs::read_to_string(dir.path().join("version.go")).unwrap();
        assert!(written.contains(r#"const Version = "1.1.1-dev""#));
        assert_eq!(
            repo.commits(),
            vec![(PathBuf::from("version.go"), "Bump version to 1.1.1-dev".to_string())]
        );
    }

    #[test]
    fn test_update_version_file_without_commit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("version.go"), GO_SOURCE).unwrap();
        let repo = MockRepository::new(dir.path());
        let config = VersionFileConfig {
            commit: false,
            ..VersionFileConfig::default()
        };

        update_version_file(&repo, "version.go", &Version::new(2, 0, 0), &config).unwrap();
        assert!(repo.commits().is_empty());
    }

    #[test]
    fn test_update_missing_file() {
        let dir = TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());
        let result = update_version_file(
            &repo,
            "missing.go",
            &Version::new(1, 0, 0),
            &VersionFileConfig::default(),
        );
        assert!(matches!(result, Err(BumpError::VersionFile(_))));
    }
}
