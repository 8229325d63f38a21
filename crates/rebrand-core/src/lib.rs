use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub mod change;
pub mod discover;
pub mod error;
pub mod metadata;
pub mod planner;
pub mod project;
pub mod runner;
pub mod text;

pub use change::{ChangeKind, ContentMatch, FileChange};
pub use error::{RebrandError, Result};
pub use planner::{PlatformSelection, ProjectRenamer};
pub use project::{AndroidInfo, ReactNativeProject};
pub use runner::{ChangeRunner, ExistencePolicy, Outcome, RunOptions, RunSummary, TargetReport};

pub fn plan_rename(
    root_dir: &Path,
    new_display_name: &str,
    platforms: PlatformSelection,
) -> Result<Vec<FileChange>> {
    info!("Planning rename of {:?} to '{}'", root_dir, new_display_name);
    let project = ReactNativeProject::build(root_dir)?;
    Ok(ProjectRenamer::new(&project).rename_app(new_display_name, platforms))
}

pub fn plan_bundle_id_change(
    root_dir: &Path,
    new_bundle_id: &str,
    platforms: PlatformSelection,
) -> Result<Vec<FileChange>> {
    info!("Planning bundle id change of {:?} to '{}'", root_dir, new_bundle_id);
    let project = ReactNativeProject::build(root_dir)?.with_android_detected()?;
    if platforms.android && project.android_bundle_id().is_none() {
        warn!("No Android bundle id found - Android files will not be changed");
    }
    ProjectRenamer::new(&project).change_bundle_id(new_bundle_id, platforms)
}

/// Builds a runner whose relative targets resolve against `root_dir` unless the
/// options already name a root.
pub fn runner_for(root_dir: &Path, mut options: RunOptions) -> ChangeRunner {
    if options.root_dir.is_none() {
        options.root_dir = Some(root_dir.to_path_buf());
    }
    ChangeRunner::new(options)
}

/// Deletes each directory recursively, returning how many were removed.
pub fn remove_dirs(dirs: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for dir in dirs {
        if dir.is_dir() {
            info!("Removing directory: {:?}", dir);
            fs::remove_dir_all(dir)?;
            removed += 1;
        }
    }
    Ok(removed)
}
