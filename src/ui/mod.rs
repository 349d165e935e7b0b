//! User interface module.
//!
//! All terminal output of the binary goes through [formatter]; the library itself
//! only logs through `tracing`.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_dry_run, display_error, display_status, display_success,
    display_versions, format_push_preference,
};
