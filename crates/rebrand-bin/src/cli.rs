use clap::{Args, Parser, Subcommand};
use rebrand_core::{ExistencePolicy, PlatformSelection};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rebrand")]
#[command(version)]
#[command(about = "Rename and re-identify React Native projects")]
#[command(long_about = "A CLI tool that renames React Native apps and changes their bundle ids by planning and applying an ordered set of file moves, content updates and removals across the iOS and Android subtrees.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Rename the app (display name and app key)")]
    RenameApp {
        #[arg(help = "New display name; the app key is this name without whitespace", value_parser = parse_display_name)]
        new_name: String,

        #[command(flatten)]
        run: RunArgs,
    },

    #[command(about = "Change the app bundle id")]
    ChangeBundleId {
        #[arg(help = "New bundle id, e.g. 'com.example.app'")]
        new_bundle_id: String,

        #[command(flatten)]
        run: RunArgs,
    },

    #[command(about = "Recursively remove all node_modules directories")]
    RemoveNodeModules {
        #[arg(help = "Directory to search")]
        dir: PathBuf,

        #[arg(short, long, help = "Remove without asking for confirmation")]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, env = "REBRAND_PROJECT_DIR", help = "React Native project root (defaults to current directory)")]
    pub dir: Option<PathBuf>,

    #[arg(long, help = "Only change iOS files")]
    pub ios: bool,

    #[arg(long, help = "Only change Android files")]
    pub android: bool,

    #[arg(long, help = "Fail when a planned target does not exist instead of skipping it")]
    pub strict: bool,

    #[arg(long, help = "Perform a dry run without making changes")]
    pub dry_run: bool,

    #[arg(short, long, help = "Interactive mode - prompt for each change")]
    pub interactive: bool,
}

impl RunArgs {
    pub fn platforms(&self) -> PlatformSelection {
        PlatformSelection::from_flags(self.ios, self.android)
    }

    pub fn policy(&self) -> ExistencePolicy {
        if self.strict {
            ExistencePolicy::Strict
        } else {
            ExistencePolicy::Skip
        }
    }
}

fn parse_display_name(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("the new name must contain at least one non-whitespace character".to_string())
    } else {
        Ok(value.to_string())
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
