//! Ignore rules from `.gitignore` files and `info/exclude`.
//!
//! Patterns are kept in load order and the last matching pattern decides, so
//! files loaded later (deeper `.gitignore` files) override earlier ones. A
//! pattern from `sub/.gitignore` only applies below `sub/`.

use std::path::Path;

use bstr::{BStr, BString, ByteSlice};
use sprig_utils::wildmatch::{WildmatchFlags, WildmatchPattern};
use tracing::trace;

use crate::IndexError;

#[derive(Debug, Clone)]
struct IgnorePattern {
    glob: WildmatchPattern,
    /// Directory the pattern was read from, relative to the repository root
    /// and without a trailing slash. Empty for the root.
    base: BString,
    negated: bool,
    dir_only: bool,
    /// Matched against the full path below `base` rather than the basename.
    anchored: bool,
}

impl IgnorePattern {
    fn parse(line: &[u8], base: &BStr) -> Option<Self> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() || line[0] == b'#' {
            return None;
        }
        let line = trim_trailing_spaces(line);

        let (negated, line) = match line.strip_prefix(b"!") {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        // `\#` and `\!` escape a leading marker.
        let line = match line {
            [b'\\', b'#' | b'!', ..] => &line[1..],
            _ => line,
        };

        let (dir_only, line) = match line.strip_suffix(b"/") {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        if line.is_empty() {
            return None;
        }

        let anchored = line.contains(&b'/');
        let line = line.strip_prefix(b"/").unwrap_or(line);

        Some(Self {
            glob: WildmatchPattern::new(line.as_bstr(), WildmatchFlags::PATHNAME),
            base: base.trim_end_with(|c| c == '/').into(),
            negated,
            dir_only,
            anchored,
        })
    }

    fn matches(&self, path: &BStr, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let rel = if self.base.is_empty() {
            path
        } else {
            match path
                .strip_prefix(self.base.as_bytes())
                .and_then(|rest| rest.strip_prefix(b"/"))
            {
                Some(rest) => rest.as_bstr(),
                None => return false,
            }
        };
        if self.anchored {
            self.glob.matches(rel)
        } else {
            let name = rel.rsplit_str("/").next().unwrap_or(rel.as_bytes());
            self.glob.matches(name.as_bstr())
        }
    }
}

/// Trailing spaces are dropped unless escaped with a backslash.
fn trim_trailing_spaces(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b' '] = line {
        if rest.last() == Some(&b'\\') {
            break;
        }
        line = rest;
    }
    line
}

/// Ordered collection of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreStack {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a pattern file whose rules apply below `base` (repository
    /// relative, empty for the root). A missing file adds nothing.
    pub fn add_file(&mut self, path: &Path, base: &BStr) -> Result<(), IndexError> {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let before = self.patterns.len();
        self.add_patterns(&content, base);
        trace!(file = %path.display(), patterns = self.patterns.len() - before, "loaded ignore file");
        Ok(())
    }

    /// Add patterns from gitignore-formatted text.
    pub fn add_patterns(&mut self, content: &[u8], base: &BStr) {
        self.patterns
            .extend(content.lines().filter_map(|line| IgnorePattern::parse(line, base)));
    }

    /// Whether `path` is ignored. A path inside an ignored directory is
    /// ignored no matter what later patterns say about the path itself.
    pub fn is_ignored(&self, path: &BStr, is_dir: bool) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let ancestor_ignored = path
            .char_indices()
            .filter(|&(_, _, c)| c == '/')
            .any(|(start, _, _)| self.decide(path[..start].as_bstr(), true));
        ancestor_ignored || self.decide(path, is_dir)
    }

    fn decide(&self, path: &BStr, is_dir: bool) -> bool {
        self.patterns
            .iter()
            .rev()
            .find(|p| p.matches(path, is_dir))
            .is_some_and(|p| !p.negated)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
