//! Three-way status: HEAD tree, index and working tree.

use std::cmp::Ordering;
use std::fmt;

use bstr::BString;
use sprig_diff::{diff_head_to_index, diff_index_to_worktree, find_untracked, DiffOptions, FileDiff, FileStatus};
use sprig_index::Pathspec;
use sprig_repository::Repository;
use tracing::debug;

use crate::Result;

/// State of one path in one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    New,
    Modified,
    Deleted,
    Renamed,
    TypeChange,
    /// The path has unmerged stages in the index.
    Conflicted,
    Unmodified,
}

impl Status {
    /// One-letter code in the style of `git status --short`.
    pub fn as_char(self) -> char {
        match self {
            Status::New => 'A',
            Status::Modified => 'M',
            Status::Deleted => 'D',
            Status::Renamed => 'R',
            Status::TypeChange => 'T',
            Status::Conflicted => 'U',
            Status::Unmodified => ' ',
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::New => "new",
            Status::Modified => "modified",
            Status::Deleted => "deleted",
            Status::Renamed => "renamed",
            Status::TypeChange => "typechange",
            Status::Conflicted => "conflicted",
            Status::Unmodified => "unmodified",
        };
        f.write_str(name)
    }
}

impl From<FileStatus> for Status {
    fn from(status: FileStatus) -> Self {
        match status {
            FileStatus::Added => Status::New,
            FileStatus::Deleted => Status::Deleted,
            FileStatus::Modified => Status::Modified,
            FileStatus::Renamed => Status::Renamed,
            FileStatus::TypeChanged => Status::TypeChange,
        }
    }
}

/// One row of a status report. A path changed both in the index and in the
/// working tree yields two rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusEntry {
    /// Repository-relative path; the destination for a rename.
    pub path: BString,
    pub status: Status,
    /// Whether the row compares HEAD with the index rather than the index
    /// with the working tree.
    pub staged: bool,
    /// Source path of a rename.
    pub source: Option<BString>,
}

impl StatusEntry {
    fn from_diff(diff: &FileDiff, staged: bool) -> Self {
        let source = match diff.status {
            FileStatus::Renamed => diff.old_path.clone(),
            _ => None,
        };
        Self {
            path: diff.path().to_owned(),
            status: diff.status.into(),
            staged,
            source,
        }
    }
}

/// Path first, staged before unstaged.
impl Ord for StatusEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| other.staged.cmp(&self.staged))
            .then_with(|| self.status.cmp(&other.status))
            .then_with(|| self.source.cmp(&other.source))
    }
}

impl PartialOrd for StatusEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Which side of the index to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StagedFilter {
    /// HEAD against the index.
    StagedOnly,
    /// The index against the working tree, untracked files and conflicts.
    UnstagedOnly,
    #[default]
    Both,
}

impl StagedFilter {
    fn staged(self) -> bool {
        matches!(self, StagedFilter::StagedOnly | StagedFilter::Both)
    }

    fn unstaged(self) -> bool {
        matches!(self, StagedFilter::UnstagedOnly | StagedFilter::Both)
    }
}

/// Whether staged renames are paired up. `status.renames` wins over
/// `diff.renames`; both default to on.
fn renames_enabled(repo: &Repository) -> Result<bool> {
    let config = repo.config();
    match config.get_bool("status.renames")? {
        Some(enabled) => Ok(enabled),
        None => Ok(config.get_bool_or("diff.renames", true)?),
    }
}

/// Compare HEAD, the index and the working tree.
///
/// Conflicted paths are reported once, unstaged, and nowhere else. A bare
/// repository has only the staged view. Nothing is written to disk.
pub fn status(repo: &Repository, filter: StagedFilter, pathspec: &Pathspec) -> Result<Vec<StatusEntry>> {
    let index = repo.current_index()?;
    let mut entries = Vec::new();

    if filter.staged() {
        let options = DiffOptions {
            detect_renames: renames_enabled(repo)?,
            pathspec: pathspec.clone(),
            ..Default::default()
        };
        let staged = diff_head_to_index(repo, &index, &options)?;
        entries.extend(staged.files.iter().map(|f| StatusEntry::from_diff(f, true)));
    }

    if filter.unstaged() {
        entries.extend(
            index
                .conflicted_paths()
                .into_iter()
                .filter(|path| pathspec.matches(path, false))
                .map(|path| StatusEntry {
                    path: path.to_owned(),
                    status: Status::Conflicted,
                    staged: false,
                    source: None,
                }),
        );

        if let Some(work_tree) = repo.work_tree() {
            let options = DiffOptions {
                pathspec: pathspec.clone(),
                ..Default::default()
            };
            let unstaged = diff_index_to_worktree(&index, work_tree, &options)?;
            entries.extend(unstaged.files.iter().map(|f| StatusEntry::from_diff(f, false)));

            let ignores = repo.ignore_stack()?;
            for path in find_untracked(&index, work_tree, &ignores, pathspec)? {
                entries.push(StatusEntry {
                    path,
                    status: Status::New,
                    staged: false,
                    source: None,
                });
            }
        }
    }

    entries.sort();
    debug!(?filter, rows = entries.len(), "computed status");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, status: Status, staged: bool) -> StatusEntry {
        StatusEntry {
            path: path.into(),
            status,
            staged,
            source: None,
        }
    }

    #[test]
    fn rows_sort_by_path_then_staged_first() {
        let mut rows = vec![
            entry("b", Status::Modified, false),
            entry("a", Status::Deleted, false),
            entry("b", Status::Modified, true),
            entry("a/x", Status::New, true),
        ];
        rows.sort();
        let got: Vec<(String, bool)> = rows.iter().map(|r| (r.path.to_string(), r.staged)).collect();
        assert_eq!(
            got,
            [
                ("a".to_string(), false),
                ("a/x".to_string(), true),
                ("b".to_string(), true),
                ("b".to_string(), false),
            ]
        );
    }

    #[test]
    fn ordering_is_total() {
        let a = entry("p", Status::New, false);
        let b = entry("p", Status::Deleted, false);
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn codes() {
        assert_eq!(Status::from(FileStatus::Added), Status::New);
        assert_eq!(Status::from(FileStatus::TypeChanged).as_char(), 'T');
        assert_eq!(Status::Conflicted.to_string(), "conflicted");
    }
}
