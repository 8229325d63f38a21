mod cli;
mod diff;

use anyhow::Result;
use cli::{Cli, Commands, RunArgs};
use rebrand_core::{FileChange, Outcome, PlatformSelection, RebrandError, RunOptions, RunSummary, TargetReport};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting rebrand");

    match cli.command {
        Commands::RenameApp { new_name, run } => handle_rename_app_command(new_name, run)?,
        Commands::ChangeBundleId { new_bundle_id, run } => {
            handle_change_bundle_id_command(new_bundle_id, run)?
        }
        Commands::RemoveNodeModules { dir, yes } => handle_remove_node_modules_command(dir, yes)?,
    }

    info!("Rebrand completed successfully");
    Ok(())
}

fn handle_rename_app_command(new_name: String, run: RunArgs) -> Result<()> {
    let root_dir = project_dir(&run)?;
    let platforms = run.platforms();

    info!("Rename app: '{}'", new_name);
    log_run_args(&root_dir, platforms, &run);

    let changes = rebrand_core::plan_rename(&root_dir, &new_name, platforms)?;

    let summary = run_changes(&root_dir, &changes, &run)?;

    println!("Rename complete!");
    print_summary(&summary);

    Ok(())
}

fn handle_change_bundle_id_command(new_bundle_id: String, run: RunArgs) -> Result<()> {
    let root_dir = project_dir(&run)?;
    let platforms = run.platforms();

    info!("Change bundle id: '{}'", new_bundle_id);
    log_run_args(&root_dir, platforms, &run);

    let changes = rebrand_core::plan_bundle_id_change(&root_dir, &new_bundle_id, platforms)?;

    let summary = run_changes(&root_dir, &changes, &run)?;

    println!("Bundle id change complete!");
    print_summary(&summary);

    Ok(())
}

fn handle_remove_node_modules_command(dir: PathBuf, yes: bool) -> Result<()> {
    const SEARCH_DIR: &str = "node_modules";

    if !dir.is_dir() {
        anyhow::bail!("Target must be a directory: {:?}", dir);
    }

    let found = rebrand_core::discover::find_dirs_named(SEARCH_DIR, &dir)?;
    if found.is_empty() {
        println!("No directory named {} has been found in {}.", SEARCH_DIR, dir.display());
        return Ok(());
    }

    println!("List of directories named {} found in {}:", SEARCH_DIR, dir.display());
    for (i, found_dir) in found.iter().enumerate() {
        println!("{}. {}", i + 1, found_dir.display());
    }

    if !yes {
        use inquire::Confirm;

        let confirmed = Confirm::new("Are you sure you want to remove all directories above?")
            .with_default(true)
            .prompt()?;

        if !confirmed {
            println!("Directories have been kept.");
            return Ok(());
        }
    }

    let removed = rebrand_core::remove_dirs(&found)?;
    println!(
        "{} {} been removed successfully.",
        removed,
        if removed == 1 { "directory has" } else { "directories have" }
    );

    Ok(())
}

fn project_dir(run: &RunArgs) -> Result<PathBuf> {
    let root_dir = match &run.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    if !root_dir.exists() {
        anyhow::bail!("Project directory does not exist: {:?}", root_dir);
    }

    if !root_dir.is_dir() {
        anyhow::bail!("Project path must be a directory: {:?}", root_dir);
    }

    Ok(root_dir)
}

fn log_run_args(root_dir: &Path, platforms: PlatformSelection, run: &RunArgs) {
    info!("Project directory: {:?}", root_dir);
    info!("iOS: {}, Android: {}", platforms.ios, platforms.android);
    info!("Existence policy: {:?}", run.policy());
    info!("Interactive mode: {}", run.interactive);
}

fn run_changes(root_dir: &Path, changes: &[FileChange], run: &RunArgs) -> Result<RunSummary> {
    let runner = rebrand_core::runner_for(root_dir, RunOptions {
        root_dir: None,
        report: true,
        policy: run.policy(),
        dry_run: run.dry_run,
    });

    let summary = if run.interactive {
        let content_callback = |file_path: &Path, old_content: &str, new_content: &str| -> rebrand_core::Result<bool> {
            diff::show_diff_and_confirm(file_path, old_content, new_content)
                .map_err(|e| RebrandError::Aborted { message: e.to_string() })
        };

        let path_callback = |path: &Path, dest: Option<&Path>, change_type: &str| -> rebrand_core::Result<bool> {
            diff::show_path_change_and_confirm(path, dest, change_type)
                .map_err(|e| RebrandError::Aborted { message: e.to_string() })
        };

        runner.run_series_interactive(changes, print_report, content_callback, path_callback)?
    } else {
        runner.run_series_with(changes, print_report)?
    };

    Ok(summary)
}

fn print_report(report: &TargetReport) {
    let style = match report.outcome {
        Outcome::Skipped | Outcome::Kept => "\x1b[33m", // Yellow
        _ => "\x1b[32m",                                // Green
    };
    println!("{} {}{}\x1b[0m", report.target.display(), style, report.outcome);
}

fn print_summary(summary: &RunSummary) {
    println!("  Moved: {}", summary.count(Outcome::Moved));
    println!("  Updated: {}", summary.count(Outcome::Updated));
    println!("  Removed: {}", summary.count(Outcome::Removed));
    println!("  Skipped: {}", summary.count(Outcome::Skipped));
    if summary.count(Outcome::Kept) > 0 {
        println!("  Kept: {}", summary.count(Outcome::Kept));
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
