use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_bump::cli::{self, BumpOptions};
use git_bump::config::{self, Config};
use git_bump::domain::{self, BumpKind};
use git_bump::git::{Git2Repository, Repository};
use git_bump::ui;

#[derive(Parser)]
#[command(
    name = "git-bump",
    version,
    about = "Create the next semantic version tag for a git repository"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        help = "Run as if started in this directory"
    )]
    repo: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct BumpArgs {
    #[arg(short, long, help = "Pre-release suffix for the new tag, e.g. rc.1")]
    suffix: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_name = "FILE",
        help = "Move the version constant in FILE to the next dev version"
    )]
    update_file: Option<String>,

    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
        help = "Push the new tag to the remote [default: repository preference]"
    )]
    push: Option<bool>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Increment the patch version
    #[command(visible_alias = "p")]
    Patch(BumpArgs),

    /// Increment the minor version
    #[command(visible_alias = "m")]
    Minor(BumpArgs),

    /// Increment the major version
    #[command(visible_alias = "M")]
    Major(BumpArgs),

    /// Push all tags to the configured remote
    Push,

    /// Show or set this repository's push preference
    Config {
        #[arg(
            long,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true",
            value_name = "BOOL",
            help = "Push after every bump in this repository"
        )]
        default_push: Option<bool>,
    },

    /// Print the latest version tag
    Latest,

    /// List version tags, newest first
    List,
}

fn init_logging() {
    let filter = match std::env::var("DEBUG") {
        Ok(value) if !value.is_empty() => EnvFilter::new("debug"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let repo = Git2Repository::discover(&args.repo, config.lock.clone())
        .with_context(|| format!("Not a git repository: {}", args.repo))?;

    match args.command {
        Command::Patch(bump) => run_bump(&repo, &config, BumpKind::Patch, bump),
        Command::Minor(bump) => run_bump(&repo, &config, BumpKind::Minor, bump),
        Command::Major(bump) => run_bump(&repo, &config, BumpKind::Major, bump),
        Command::Push => {
            repo.push_tags(&config.remote)
                .context("Failed to push tags")?;
            ui::display_success("Successfully pushed tags to remote.");
            Ok(())
        }
        Command::Config { default_push } => {
            match default_push {
                Some(value) => {
                    repo.set_push_preference(value)
                        .context("Failed to set default push")?;
                    ui::display_success(&format!("Set default push to {} for this repo.", value));
                }
                None => {
                    let current = repo.push_preference()?;
                    println!("{}", ui::format_push_preference(current));
                }
            }
            Ok(())
        }
        Command::Latest => {
            match domain::select_latest(repo.list_tags()?) {
                Some(latest) => println!("{}", latest.source_tag()),
                None => ui::display_status("No version tags found"),
            }
            Ok(())
        }
        Command::List => {
            let versions = domain::sorted_versions(repo.list_tags()?);
            if versions.is_empty() {
                ui::display_status("No version tags found");
            } else {
                ui::display_versions(&versions);
            }
            Ok(())
        }
    }
}

fn run_bump(repo: &Git2Repository, config: &Config, kind: BumpKind, args: BumpArgs) -> Result<()> {
    let options = BumpOptions {
        kind,
        suffix: args.suffix,
        update_file: args.update_file,
        push: args.push,
        dry_run: args.dry_run,
    };

    let outcome = cli::run_bump(repo, config, &options)?;

    for warning in &outcome.warnings {
        ui::display_boundary_warning(warning);
    }

    if outcome.dry_run {
        let file = options.update_file.as_deref();
        ui::display_dry_run(&cli::format_dry_run_message(&outcome.next_tag, outcome.pushed, file));
        return Ok(());
    }

    if let Some(previous) = &outcome.previous_tag {
        ui::display_status(&format!("{} -> {}", previous, outcome.next_tag));
    }
    ui::display_success(&cli::format_bump_message(&outcome.next_tag, outcome.pushed));

    if let (Some(file), Some(dev)) = (&options.update_file, &outcome.file_updated) {
        ui::display_success(&format!("Updated {} to {}", file, dev));
    }

    Ok(())
}
