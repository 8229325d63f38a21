use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::change::{ContentMatch, FileChange};
use crate::error::{RebrandError, Result};

/// What to do when a planned target does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistencePolicy {
    #[default]
    Skip,
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub root_dir: Option<PathBuf>,
    pub report: bool,
    pub policy: ExistencePolicy,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Moved,
    Updated,
    Removed,
    Skipped,
    Kept,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Outcome::Moved => "MOVED",
            Outcome::Updated => "UPDATED",
            Outcome::Removed => "REMOVED",
            Outcome::Skipped => "NOT FOUND and SKIPPED",
            Outcome::Kept => "KEPT",
        };
        f.write_str(word)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: PathBuf,
    pub outcome: Outcome,
}

impl fmt::Display for TargetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target.display(), self.outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<TargetReport>,
}

impl RunSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.reports.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Applies [`FileChange`]s one target at a time, strictly in order.
pub struct ChangeRunner {
    options: RunOptions,
}

impl ChangeRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn run_series(&self, changes: &[FileChange]) -> Result<RunSummary> {
        self.run_series_with(changes, |_| {})
    }

    pub fn run_series_with<R>(&self, changes: &[FileChange], on_report: R) -> Result<RunSummary>
    where
        R: FnMut(&TargetReport),
    {
        self.run_series_interactive(changes, on_report, |_, _, _| Ok(true), |_, _, _| Ok(true))
    }

    /// Like [`run_series_with`](Self::run_series_with), but every content update is offered
    /// to `content_callback(path, old, new)` and every move or removal to
    /// `path_callback(path, dest, change_type)`; a `false` answer keeps the target as is.
    pub fn run_series_interactive<R, F, G>(
        &self,
        changes: &[FileChange],
        mut on_report: R,
        content_callback: F,
        path_callback: G,
    ) -> Result<RunSummary>
    where
        R: FnMut(&TargetReport),
        F: Fn(&Path, &str, &str) -> Result<bool>,
        G: Fn(&Path, Option<&Path>, &str) -> Result<bool>,
    {
        info!("Running {} change(s)", changes.len());
        if self.options.dry_run {
            warn!("Dry run mode - no changes will be made");
        }

        let mut summary = RunSummary::default();
        let mut relocations = Relocations::default();
        for change in changes {
            debug!("Running {}", change);
            for target in change.targets() {
                let outcome =
                    self.run_target(change, target, &mut relocations, &content_callback, &path_callback)?;
                let report = TargetReport {
                    target: target.to_path_buf(),
                    outcome,
                };
                if self.options.report {
                    on_report(&report);
                }
                summary.reports.push(report);
            }
        }

        info!(
            "Run complete: {} moved, {} updated, {} removed, {} skipped, {} kept",
            summary.count(Outcome::Moved),
            summary.count(Outcome::Updated),
            summary.count(Outcome::Removed),
            summary.count(Outcome::Skipped),
            summary.count(Outcome::Kept)
        );
        Ok(summary)
    }

    fn run_target<F, G>(
        &self,
        change: &FileChange,
        target: &Path,
        relocations: &mut Relocations,
        content_callback: &F,
        path_callback: &G,
    ) -> Result<Outcome>
    where
        F: Fn(&Path, &str, &str) -> Result<bool>,
        G: Fn(&Path, Option<&Path>, &str) -> Result<bool>,
    {
        let abs_target = self.resolve(target);
        let on_disk = match relocations.locate(&abs_target) {
            Location::At(path) if path.symlink_metadata().is_ok() => path,
            Location::Kept => {
                debug!("{:?} lies under a kept move, keeping it", abs_target);
                return Ok(Outcome::Kept);
            }
            Location::At(_) | Location::Gone => return self.missing(&abs_target),
        };

        match change {
            FileChange::Move {
                dest,
                create_intermediate_dirs,
                ..
            } => {
                let abs_dest = self.resolve(dest);
                let dest_on_disk = match relocations.locate(&abs_dest) {
                    Location::At(path) => path,
                    Location::Kept | Location::Gone => abs_dest.clone(),
                };
                let final_dest =
                    final_destination(&abs_target, &abs_dest, &dest_on_disk, *create_intermediate_dirs);

                if !path_callback(&abs_target, Some(&final_dest), "Move")? {
                    relocations.push(Relocation::Kept(final_dest));
                    return Ok(Outcome::Kept);
                }
                self.move_path(&on_disk, &final_dest, &dest_on_disk, *create_intermediate_dirs)?;
                if self.options.dry_run {
                    relocations.push(Relocation::Moved {
                        from: abs_target,
                        to: final_dest,
                    });
                }
                Ok(Outcome::Moved)
            }
            FileChange::UpdateContent {
                matcher,
                replace_with,
                ..
            } => self.update_content(&abs_target, &on_disk, matcher, replace_with, content_callback),
            FileChange::Remove { .. } => {
                if !path_callback(&abs_target, None, "Remove")? {
                    return Ok(Outcome::Kept);
                }
                self.remove_path(&on_disk)?;
                if self.options.dry_run {
                    relocations.push(Relocation::Removed(abs_target));
                }
                Ok(Outcome::Removed)
            }
        }
    }

    fn resolve(&self, target: &Path) -> PathBuf {
        match &self.options.root_dir {
            Some(root) if target.is_relative() => root.join(target),
            _ => target.to_path_buf(),
        }
    }

    fn missing(&self, path: &Path) -> Result<Outcome> {
        match self.options.policy {
            ExistencePolicy::Skip => {
                debug!("{:?} not found, skipping", path);
                Ok(Outcome::Skipped)
            }
            ExistencePolicy::Strict => Err(RebrandError::TargetNotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn move_path(
        &self,
        source: &Path,
        final_dest: &Path,
        dest_on_disk: &Path,
        create_intermediate_dirs: bool,
    ) -> Result<()> {
        if create_intermediate_dirs && !dest_on_disk.exists() {
            if self.options.dry_run {
                info!("Would create directory: {:?}", dest_on_disk);
            } else {
                fs::create_dir_all(dest_on_disk)?;
            }
        }

        if final_dest == source {
            debug!("{:?} is already in place", source);
            return Ok(());
        }

        if self.options.dry_run {
            info!("Would move: {:?} -> {:?}", source, final_dest);
            return Ok(());
        }

        info!("Moving: {:?} -> {:?}", source, final_dest);
        if final_dest.symlink_metadata().is_ok() {
            self.remove_path(final_dest)?;
        }
        if let Some(parent) = final_dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(source, final_dest)?;
        Ok(())
    }

    fn update_content<F>(
        &self,
        target: &Path,
        on_disk: &Path,
        matcher: &ContentMatch,
        replace_with: &str,
        content_callback: &F,
    ) -> Result<Outcome>
    where
        F: Fn(&Path, &str, &str) -> Result<bool>,
    {
        let content = match fs::read_to_string(on_disk) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Skipping non-UTF-8 file: {:?}", target);
                return Ok(Outcome::Kept);
            }
            Err(e) => return Err(e.into()),
        };
        let Some(new_content) = matcher.apply(&content, replace_with) else {
            debug!("No match for {} in {:?}", matcher, target);
            return Ok(Outcome::Updated);
        };

        if !content_callback(target, &content, &new_content)? {
            return Ok(Outcome::Kept);
        }

        if self.options.dry_run {
            info!("Would update contents of: {:?}", target);
        } else {
            info!("Updating contents of: {:?}", target);
            fs::write(on_disk, new_content)?;
        }
        Ok(Outcome::Updated)
    }

    fn remove_path(&self, target: &Path) -> Result<()> {
        if self.options.dry_run {
            info!("Would remove: {:?}", target);
            return Ok(());
        }

        info!("Removing: {:?}", target);
        let metadata = target.symlink_metadata()?;
        if metadata.is_dir() {
            fs::remove_dir_all(target)?;
        } else {
            fs::remove_file(target)?;
        }
        Ok(())
    }
}

// An existing directory destination receives the target inside it, as does one about to be created.
fn final_destination(target: &Path, dest: &Path, dest_on_disk: &Path, create_intermediate_dirs: bool) -> PathBuf {
    match target.file_name() {
        Some(name) if dest_on_disk.is_dir() || (create_intermediate_dirs && !dest_on_disk.exists()) => {
            dest.join(name)
        }
        _ => dest.to_path_buf(),
    }
}

/// Moves and removals the tree has not seen, either simulated by a dry run or declined.
#[derive(Debug)]
enum Relocation {
    Moved { from: PathBuf, to: PathBuf },
    Kept(PathBuf),
    Removed(PathBuf),
}

enum Location {
    At(PathBuf),
    Kept,
    Gone,
}

#[derive(Debug, Default)]
struct Relocations(Vec<Relocation>);

impl Relocations {
    fn push(&mut self, relocation: Relocation) {
        self.0.push(relocation);
    }

    /// Maps a planned path back to where it currently sits on disk.
    fn locate(&self, path: &Path) -> Location {
        let mut current = path.to_path_buf();
        for relocation in self.0.iter().rev() {
            match relocation {
                Relocation::Moved { from, to } => {
                    if let Ok(rest) = current.strip_prefix(to) {
                        current = if rest.as_os_str().is_empty() {
                            from.clone()
                        } else {
                            from.join(rest)
                        };
                    }
                }
                Relocation::Kept(planned) if current.starts_with(planned) => return Location::Kept,
                Relocation::Removed(planned) if current.starts_with(planned) => return Location::Gone,
                _ => {}
            }
        }
        Location::At(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn runner(root: &Path, policy: ExistencePolicy) -> ChangeRunner {
        ChangeRunner::new(RunOptions {
            root_dir: Some(root.to_path_buf()),
            report: true,
            policy,
            dry_run: false,
        })
    }

    #[test]
    fn test_outcome_words() {
        assert_eq!(Outcome::Moved.to_string(), "MOVED");
        assert_eq!(Outcome::Updated.to_string(), "UPDATED");
        assert_eq!(Outcome::Removed.to_string(), "REMOVED");
        assert_eq!(Outcome::Skipped.to_string(), "NOT FOUND and SKIPPED");

        let report = TargetReport {
            target: PathBuf::from("ios/build"),
            outcome: Outcome::Removed,
        };
        assert_eq!(report.to_string(), "ios/build REMOVED");
    }

    #[test]
    fn test_skip_missing_target() {
        let dir = TempDir::new().unwrap();
        let lines = RefCell::new(Vec::new());

        let summary = runner(dir.path(), ExistencePolicy::Skip)
            .run_series_with(&[FileChange::remove(["ios/build"])], |r| {
                lines.borrow_mut().push(r.to_string())
            })
            .unwrap();

        assert_eq!(summary.count(Outcome::Skipped), 1);
        assert_eq!(lines.into_inner(), vec!["ios/build NOT FOUND and SKIPPED".to_string()]);
    }

    #[test]
    fn test_strict_missing_target_aborts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "later.txt", "keep me");

        let changes = [
            FileChange::remove(["missing"]),
            FileChange::remove(["later.txt"]),
        ];
        let result = runner(dir.path(), ExistencePolicy::Strict).run_series(&changes);

        match result {
            Err(RebrandError::TargetNotFound { path }) => assert_eq!(path, dir.path().join("missing")),
            other => panic!("Expected TargetNotFound, got {other:?}"),
        }
        assert!(dir.path().join("later.txt").exists());
    }

    #[test]
    fn test_multi_target_update_expands() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "OldApp a");
        write(dir.path(), "c.txt", "OldApp c");

        let change = FileChange::update_content(["a.txt", "b.txt", "c.txt"], "OldApp", "NewApp");
        let summary = runner(dir.path(), ExistencePolicy::Skip)
            .run_series(&[change])
            .unwrap();

        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.count(Outcome::Updated), 2);
        assert_eq!(summary.reports[1].outcome, Outcome::Skipped);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "NewApp a");
        assert_eq!(fs::read_to_string(dir.path().join("c.txt")).unwrap(), "NewApp c");
    }

    #[test]
    fn test_pattern_update() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "project.pbxproj", "PRODUCT_BUNDLE_IDENTIFIER = \"org.old\";\n");

        let change = FileChange::update_content(
            ["project.pbxproj"],
            Regex::new(r#"PRODUCT_BUNDLE_IDENTIFIER = "(.*?)""#).unwrap(),
            "PRODUCT_BUNDLE_IDENTIFIER = \"com.new.app\"",
        );
        runner(dir.path(), ExistencePolicy::Strict).run_series(&[change]).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("project.pbxproj")).unwrap(),
            "PRODUCT_BUNDLE_IDENTIFIER = \"com.new.app\";\n"
        );
    }

    #[test]
    fn test_move_renames_and_overwrites() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ios/OldApp/AppDelegate.m", "delegate");
        write(dir.path(), "ios/OldApp.h", "new header");
        write(dir.path(), "ios/NewApp.h", "stale header");

        let changes = [
            FileChange::move_path("ios/OldApp", "ios/NewApp"),
            FileChange::move_path("ios/OldApp.h", "ios/NewApp.h"),
        ];
        let summary = runner(dir.path(), ExistencePolicy::Strict).run_series(&changes).unwrap();

        assert_eq!(summary.count(Outcome::Moved), 2);
        assert!(!dir.path().join("ios/OldApp").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("ios/NewApp/AppDelegate.m")).unwrap(),
            "delegate"
        );
        assert_eq!(fs::read_to_string(dir.path().join("ios/NewApp.h")).unwrap(), "new header");
    }

    #[test]
    fn test_move_into_created_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "java/com/old/app/Main.java", "main");
        write(dir.path(), "java/com/old/app/sub/Util.java", "util");

        let changes = [
            FileChange::move_into_dir("java/com/old/app/Main.java", "java/com/new/app"),
            FileChange::move_into_dir("java/com/old/app/sub", "java/com/new/app"),
            FileChange::remove(["java/com/old/app"]),
        ];
        runner(dir.path(), ExistencePolicy::Strict).run_series(&changes).unwrap();

        assert!(dir.path().join("java/com/new/app/Main.java").is_file());
        assert!(dir.path().join("java/com/new/app/sub/Util.java").is_file());
        assert!(!dir.path().join("java/com/old/app").exists());
    }

    #[test]
    fn test_dry_run_leaves_tree_untouched() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app.json", "\"name\": \"OldApp\"");
        write(dir.path(), "ios/build/out", "");

        let runner = ChangeRunner::new(RunOptions {
            root_dir: Some(dir.path().to_path_buf()),
            report: true,
            policy: ExistencePolicy::Strict,
            dry_run: true,
        });
        let changes = [
            FileChange::update_content(["app.json"], "OldApp", "NewApp"),
            FileChange::remove(["ios/build"]),
        ];
        let summary = runner.run_series(&changes).unwrap();

        assert_eq!(summary.count(Outcome::Updated), 1);
        assert_eq!(summary.count(Outcome::Removed), 1);
        assert_eq!(fs::read_to_string(dir.path().join("app.json")).unwrap(), "\"name\": \"OldApp\"");
        assert!(dir.path().join("ios/build/out").exists());
    }

    #[test]
    fn test_declined_changes_are_kept() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "OldApp");
        write(dir.path(), "b.txt", "");

        let changes = [
            FileChange::update_content(["a.txt"], "OldApp", "NewApp"),
            FileChange::remove(["b.txt"]),
        ];
        let summary = runner(dir.path(), ExistencePolicy::Strict)
            .run_series_interactive(&changes, |_| {}, |_, _, _| Ok(false), |_, _, _| Ok(false))
            .unwrap();

        assert_eq!(summary.count(Outcome::Kept), 2);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "OldApp");
        assert!(dir.path().join("b.txt").exists());
    }

    #[test]
    fn test_absolute_targets_pass_through() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        write(other.path(), "gone.txt", "");

        let change = FileChange::remove([other.path().join("gone.txt")]);
        runner(dir.path(), ExistencePolicy::Strict).run_series(&[change]).unwrap();

        assert!(!other.path().join("gone.txt").exists());
    }

    #[test]
    fn test_no_report_when_disabled() {
        let dir = TempDir::new().unwrap();
        let runner = ChangeRunner::new(RunOptions {
            root_dir: Some(dir.path().to_path_buf()),
            ..RunOptions::default()
        });
        let mut count = 0;

        let summary = runner
            .run_series_with(&[FileChange::remove(["missing"])], |_| count += 1)
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(summary.count(Outcome::Skipped), 1);
    }

    #[test]
    fn test_dry_run_follows_simulated_moves() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ios/OldApp.xcodeproj/xcschemes/OldApp.xcscheme", "OldApp");
        write(dir.path(), "ios/build/out", "");

        let runner = ChangeRunner::new(RunOptions {
            root_dir: Some(dir.path().to_path_buf()),
            report: true,
            policy: ExistencePolicy::Strict,
            dry_run: true,
        });
        let changes = [
            FileChange::move_path("ios/OldApp.xcodeproj", "ios/NewApp.xcodeproj"),
            FileChange::move_path(
                "ios/NewApp.xcodeproj/xcschemes/OldApp.xcscheme",
                "ios/NewApp.xcodeproj/xcschemes/NewApp.xcscheme",
            ),
            FileChange::update_content(["ios/NewApp.xcodeproj/xcschemes/NewApp.xcscheme"], "OldApp", "NewApp"),
            FileChange::remove(["ios/build"]),
        ];
        let summary = runner.run_series(&changes).unwrap();

        assert_eq!(summary.count(Outcome::Moved), 2);
        assert_eq!(summary.count(Outcome::Updated), 1);
        assert_eq!(summary.count(Outcome::Removed), 1);
        assert!(dir.path().join("ios/OldApp.xcodeproj/xcschemes/OldApp.xcscheme").is_file());
        assert!(!dir.path().join("ios/NewApp.xcodeproj").exists());
    }

    #[test]
    fn test_dry_run_treats_removed_paths_as_gone() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ios/build/out", "");

        let runner = ChangeRunner::new(RunOptions {
            root_dir: Some(dir.path().to_path_buf()),
            report: true,
            policy: ExistencePolicy::Skip,
            dry_run: true,
        });
        let changes = [FileChange::remove(["ios/build"]), FileChange::remove(["ios/build/out"])];
        let summary = runner.run_series(&changes).unwrap();

        assert_eq!(summary.reports[0].outcome, Outcome::Removed);
        assert_eq!(summary.reports[1].outcome, Outcome::Skipped);
        assert!(dir.path().join("ios/build/out").exists());
    }

    #[test]
    fn test_dry_run_moves_into_missing_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "java/com/old/Main.java", "package com.old;");

        let runner = ChangeRunner::new(RunOptions {
            root_dir: Some(dir.path().to_path_buf()),
            report: true,
            policy: ExistencePolicy::Strict,
            dry_run: true,
        });
        let changes = [
            FileChange::move_into_dir("java/com/old/Main.java", "java/com/new"),
            FileChange::update_content(["java/com/new/Main.java"], "com.old", "com.new"),
            FileChange::remove(["java/com/old"]),
        ];
        let summary = runner.run_series(&changes).unwrap();

        assert_eq!(summary.count(Outcome::Moved), 1);
        assert_eq!(summary.count(Outcome::Updated), 1);
        assert_eq!(summary.count(Outcome::Removed), 1);
        assert!(!dir.path().join("java/com/new").exists());
    }

    #[test]
    fn test_declined_move_keeps_nested_targets() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ios/OldAppTests/OldAppTests.m", "");

        let changes = [
            FileChange::move_path("ios/OldAppTests", "ios/NewAppTests"),
            FileChange::move_path("ios/NewAppTests/OldAppTests.m", "ios/NewAppTests/NewAppTests.m"),
        ];
        let summary = runner(dir.path(), ExistencePolicy::Strict)
            .run_series_interactive(&changes, |_| {}, |_, _, _| Ok(true), |_, _, _| Ok(false))
            .unwrap();

        assert_eq!(summary.count(Outcome::Kept), 2);
        assert!(dir.path().join("ios/OldAppTests/OldAppTests.m").is_file());
        assert!(!dir.path().join("ios/NewAppTests").exists());
    }

    #[test]
    fn test_non_utf8_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let delegate = dir.path().join("ios/OldApp/AppDelegate.m");
        fs::create_dir_all(delegate.parent().unwrap()).unwrap();
        fs::write(&delegate, b"// \xa9 2017 OldApp\n").unwrap();
        write(dir.path(), "ios/Podfile", "target 'OldApp'");

        let changes = [
            FileChange::update_content(["ios/OldApp/AppDelegate.m", "ios/Podfile"], "OldApp", "NewApp"),
            FileChange::move_path("ios/OldApp", "ios/NewApp"),
        ];
        let summary = runner(dir.path(), ExistencePolicy::Skip).run_series(&changes).unwrap();

        assert_eq!(summary.reports[0].outcome, Outcome::Kept);
        assert_eq!(summary.reports[1].outcome, Outcome::Updated);
        assert_eq!(summary.reports[2].outcome, Outcome::Moved);
        assert_eq!(fs::read_to_string(dir.path().join("ios/Podfile")).unwrap(), "target 'NewApp'");
        assert_eq!(
            fs::read(dir.path().join("ios/NewApp/AppDelegate.m")).unwrap(),
            b"// \xa9 2017 OldApp\n"
        );
    }
}
