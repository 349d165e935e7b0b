use std::fmt;

/// Non-fatal conditions met while resolving the next tag.
/// These are reported to the user but never abort a bump.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No tag in the repository parses as a version; the initial tag is used
    NoVersionTags { initial_tag: String },
    /// Tags that exist but are not version tags
    IgnoredTags { tags: Vec<String> },
    /// A suffix was given but the initial tag is created as configured
    SuffixIgnored { suffix: String, initial_tag: String },
    /// `bump.defaultPush` holds a value other than `true`/`false`
    PushPreferenceUnreadable { reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoVersionTags { initial_tag } => {
                write!(f, "No version tags found, starting at '{}'", initial_tag)
            }
            BoundaryWarning::IgnoredTags { tags } => {
                let shown: Vec<&str> = tags.iter().take(5).map(String::as_str).collect();
                write!(f, "Ignored {} non-version tag(s): {}", tags.len(), shown.join(", "))?;
                if tags.len() > shown.len() {
                    write!(f, ", ...")?;
                }
                Ok(())
            }
            BoundaryWarning::SuffixIgnored {
                suffix,
                initial_tag,
            } => write!(
                f,
                "Ignoring suffix '{}', the first tag is '{}'",
                suffix, initial_tag
            ),
            BoundaryWarning::PushPreferenceUnreadable { reason } => {
                write!(f, "Ignoring repository push preference: {}", reason)
            }
        }
    }
}
