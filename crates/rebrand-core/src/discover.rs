use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

pub fn files_matching(root: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let glob_set = build_glob_set(patterns)?;
    let mut matched = Vec::new();

    if !root.is_dir() {
        return Ok(matched);
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if glob_set.is_match(rel_path) {
            matched.push(rel_path.to_path_buf());
        }
    }

    debug!("{} file(s) under {:?} match {:?}", matched.len(), root, patterns);
    Ok(matched)
}

pub fn children(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Finds directories named `name` below `in_dir`.
///
/// Hidden directories are not searched, and a match is not searched further, so nested
/// `node_modules` inside a found one are not reported separately.
pub fn find_dirs_named(name: &str, in_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(in_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden_dir(entry));

    while let Some(entry) = walker.next() {
        let entry = entry?;
        if entry.file_type().is_dir() && entry.file_name() == name {
            debug!("Found {:?}", entry.path());
            found.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    Ok(found)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn build_glob_set(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
