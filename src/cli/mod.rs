//! Command workflows shared by the binary and tests

pub mod orchestration;

pub use orchestration::{
    format_bump_message, format_dry_run_message, plan_next_tag, resolve_push, run_bump,
    BumpOptions, BumpOutcome, TagPlan,
};
