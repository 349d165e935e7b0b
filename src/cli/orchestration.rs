//! Main workflow orchestration logic
//!
//! The bump workflow lives here rather than in main.rs so it can run against any
//! [Repository], including the in-memory mock used in tests.

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{bump, BumpKind, PreRelease, Version};
use crate::error::{BumpError, Result};
use crate::git::Repository;
use crate::version_file;
use tracing::{debug, info, warn};

/// Arguments for the bump workflow
///
/// Mirrors the CLI subcommand flags without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct BumpOptions {
    /// Which component to increment
    pub kind: BumpKind,

    /// Pre-release suffix for the new tag, without the leading `-`
    pub suffix: Option<String>,

    /// File whose version constant is moved to the next dev version
    pub update_file: Option<String>,

    /// Explicit push decision from the command line
    pub push: Option<bool>,

    /// Preview mode - don't create tags, push or write files
    pub dry_run: bool,
}

impl BumpOptions {
    pub fn new(kind: BumpKind) -> Self {
        BumpOptions {
            kind,
            suffix: None,
            update_file: None,
            push: None,
            dry_run: false,
        }
    }
}

/// Result of a bump run
#[derive(Debug, Clone, PartialEq)]
pub struct BumpOutcome {
    /// Latest version tag before the bump, if any
    pub previous_tag: Option<String>,

    /// The tag that was (or would be) created
    pub next_tag: String,

    /// Whether the tag was (or would be) pushed
    pub pushed: bool,

    /// Dev version written to the version file
    pub file_updated: Option<String>,

    pub dry_run: bool,

    /// Non-fatal conditions to show the user
    pub warnings: Vec<BoundaryWarning>,
}

/// The current tag and the tag to create next
#[derive(Debug, Clone, PartialEq)]
pub struct TagPlan {
    pub previous: Option<Version>,
    pub next: Version,
    pub warnings: Vec<BoundaryWarning>,
}

/// Decide the next tag from a snapshot of tag names
///
/// When no tag parses, `initial_tag` is used as-is and the kind and suffix are ignored.
/// A suffix is still checked, and a warning notes that it was not applied.
pub fn plan_next_tag(
    tags: &[String],
    kind: BumpKind,
    suffix: Option<&str>,
    initial_tag: &str,
) -> Result<TagPlan> {
    let mut warnings = Vec::new();

    match crate::domain::select_latest(tags) {
        Some(latest) => {
            let next = bump(&latest, kind, suffix)?;
            debug!(latest = %latest.source_tag(), next = %next, "computed next tag");
            Ok(TagPlan {
                previous: Some(latest),
                next,
                warnings,
            })
        }
        None => {
            let next = Version::parse(initial_tag).map_err(|e| {
                BumpError::config(format!("initial_tag is not a version tag: {}", e))
            })?;
            if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
                PreRelease::parse(suffix)?;
                warnings.push(BoundaryWarning::SuffixIgnored {
                    suffix: suffix.to_string(),
                    initial_tag: next.render(),
                });
            }
            if !tags.is_empty() {
                warnings.push(BoundaryWarning::IgnoredTags {
                    tags: tags.to_vec(),
                });
            }
            warnings.push(BoundaryWarning::NoVersionTags {
                initial_tag: next.render(),
            });
            Ok(TagPlan {
                previous: None,
                next,
                warnings,
            })
        }
    }
}

/// Decide whether to push: command line, then `bump.defaultPush`, then `[push] default`
///
/// An unreadable repository preference is reported and skipped.
pub fn resolve_push<R: Repository + ?Sized>(
    cli: Option<bool>,
    repo: &R,
    config: &Config,
) -> (bool, Option<BoundaryWarning>) {
    if let Some(push) = cli {
        return (push, None);
    }

    match repo.push_preference() {
        Ok(Some(push)) => (push, None),
        Ok(None) => (config.push.default, None),
        Err(e) => {
            warn!(error = %e, "ignoring repository push preference");
            (
                config.push.default,
                Some(BoundaryWarning::PushPreferenceUnreadable {
                    reason: e.to_string(),
                }),
            )
        }
    }
}

/// Main bump workflow
///
/// 1. Under the repository lock, snapshot the tags, compute the next tag (or fall
///    back to the initial tag) and create it; a dry run only snapshots and computes
/// 2. Push the tag if requested
/// 3. Rewrite the version file if requested
pub fn run_bump<R: Repository + ?Sized>(
    repo: &R,
    config: &Config,
    options: &BumpOptions,
) -> Result<BumpOutcome> {
    // reject a bad path before anything is written
    if let Some(file) = &options.update_file {
        version_file::validate_file_path(file)?;
    }

    let (push, push_warning) = resolve_push(options.push, repo, config);

    let plan_from = |tags: &[String]| {
        plan_next_tag(
            tags,
            options.kind,
            options.suffix.as_deref(),
            &config.initial_tag,
        )
    };

    let plan = if options.dry_run {
        plan_from(&repo.list_tags()?)?
    } else {
        let mut planned = None;
        repo.create_tag_from_snapshot(&mut |tags| {
            let plan = plan_from(tags)?;
            let name = plan.next.render();
            planned = Some(plan);
            Ok(name)
        })?;
        planned.ok_or_else(|| BumpError::tag("tag was created without a plan"))?
    };
    let next_tag = plan.next.render();

    let mut warnings = plan.warnings;
    warnings.extend(push_warning);

    let mut outcome = BumpOutcome {
        previous_tag: plan.previous.as_ref().map(|v| v.source_tag().to_string()),
        next_tag,
        pushed: push,
        file_updated: None,
        dry_run: options.dry_run,
        warnings,
    };

    if options.dry_run {
        if options.update_file.is_some() {
            outcome.file_updated =
                Some(version_file::dev_version(&plan.next, &config.version_file.dev_suffix)?);
        }
        info!(tag = %outcome.next_tag, push, "dry run, nothing changed");
        return Ok(outcome);
    }

    if push {
        repo.push_tag(&config.remote, &outcome.next_tag)?;
    }

    if let Some(file) = &options.update_file {
        let dev = version_file::update_version_file(repo, file, &plan.next, &config.version_file)?;
        outcome.file_updated = Some(dev);
    }

    Ok(outcome)
}

/// Success line printed after the tag was created
pub fn format_bump_message(tag: &str, pushed: bool) -> String {
    if pushed {
        format!("Successfully created and pushed tag {}", tag)
    } else {
        format!("Successfully created tag {}. To push, run: git push --tags", tag)
    }
}

/// Preview printed instead of making changes
pub fn format_dry_run_message(tag: &str, would_push: bool, update_file: Option<&str>) -> String {
    let mut msg = format!("Would create tag: {}\n", tag);
    if would_push {
        msg.push_str("Would push tag to remote\n");
    }
    if let Some(file) = update_file {
        msg.push_str(&format!("Would update file: {}\n", file));
    }
    msg
}
