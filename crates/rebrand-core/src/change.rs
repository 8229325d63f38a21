use std::fmt;
use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};

/// What an [`FileChange::UpdateContent`] looks for in a file.
#[derive(Debug, Clone)]
pub enum ContentMatch {
    Literal(String),
    Pattern(Regex),
}

impl ContentMatch {
    /// Applies the substitution, returning `None` when nothing matched.
    pub fn apply(&self, content: &str, replace_with: &str) -> Option<String> {
        match self {
            ContentMatch::Literal(needle) => {
                if needle.is_empty() || !content.contains(needle.as_str()) {
                    None
                } else {
                    Some(content.replace(needle.as_str(), replace_with))
                }
            }
            ContentMatch::Pattern(pattern) => {
                if pattern.is_match(content) {
                    Some(pattern.replace_all(content, NoExpand(replace_with)).into_owned())
                } else {
                    None
                }
            }
        }
    }
}

impl PartialEq for ContentMatch {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ContentMatch::Literal(a), ContentMatch::Literal(b)) => a == b,
            (ContentMatch::Pattern(a), ContentMatch::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for ContentMatch {}

impl fmt::Display for ContentMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentMatch::Literal(needle) => write!(f, "{:?}", needle),
            ContentMatch::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

impl From<&str> for ContentMatch {
    fn from(value: &str) -> Self {
        ContentMatch::Literal(value.to_string())
    }
}

impl From<String> for ContentMatch {
    fn from(value: String) -> Self {
        ContentMatch::Literal(value)
    }
}

impl From<Regex> for ContentMatch {
    fn from(value: Regex) -> Self {
        ContentMatch::Pattern(value)
    }
}

/// A single planned file-system operation. Targets are relative to the project root
/// unless they are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Move {
        target: PathBuf,
        dest: PathBuf,
        create_intermediate_dirs: bool,
    },
    UpdateContent {
        target: Vec<PathBuf>,
        matcher: ContentMatch,
        replace_with: String,
    },
    Remove {
        target: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Move,
    UpdateContent,
    Remove,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ChangeKind::Move => "move",
            ChangeKind::UpdateContent => "updateContent",
            ChangeKind::Remove => "remove",
        };
        f.write_str(tag)
    }
}

impl FileChange {
    pub fn move_path(target: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        FileChange::Move {
            target: target.into(),
            dest: dest.into(),
            create_intermediate_dirs: false,
        }
    }

    /// A move that creates `dest` as a directory first when it does not exist.
    pub fn move_into_dir(target: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        FileChange::Move {
            target: target.into(),
            dest: dest.into(),
            create_intermediate_dirs: true,
        }
    }

    pub fn update_content<I, P>(target: I, matcher: impl Into<ContentMatch>, replace_with: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        FileChange::UpdateContent {
            target: target.into_iter().map(Into::into).collect(),
            matcher: matcher.into(),
            replace_with: replace_with.into(),
        }
    }

    pub fn remove<I, P>(target: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        FileChange::Remove {
            target: target.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            FileChange::Move { .. } => ChangeKind::Move,
            FileChange::UpdateContent { .. } => ChangeKind::UpdateContent,
            FileChange::Remove { .. } => ChangeKind::Remove,
        }
    }

    pub fn targets(&self) -> Vec<&Path> {
        match self {
            FileChange::Move { target, .. } => vec![target.as_path()],
            FileChange::UpdateContent { target, .. } | FileChange::Remove { target } => {
                target.iter().map(PathBuf::as_path).collect()
            }
        }
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileChange::Move { target, dest, .. } => {
                write!(f, "move {} -> {}", target.display(), dest.display())
            }
            FileChange::UpdateContent {
                target,
                matcher,
                replace_with,
            } => write!(
                f,
                "updateContent {} -> {:?} in {} file(s)",
                matcher,
                replace_with,
                target.len()
            ),
            FileChange::Remove { target } => write!(f, "remove {} path(s)", target.len()),
        }
    }
}
