//! Pathspecs: the path patterns accepted by `status`, `add` and `rm`.
//!
//! A pattern without wildcards matches the path itself and everything under
//! it (`src` matches `src/main.rs`). A pattern with wildcards is matched with
//! [`wildmatch`](sprig_utils::wildmatch) against the whole path, where `*`
//! also crosses directories unless `:(glob)` is given. Magic prefixes:
//! `:(exclude)`, `:!`, `:^`, and the long forms `:(top)`, `:(icase)`,
//! `:(glob)`, `:(literal)`.

use bstr::{BStr, BString, ByteSlice};
use sprig_utils::wildmatch::{has_glob_chars, WildmatchFlags, WildmatchPattern};

use crate::IndexError;

/// Magic attached to a single pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathspecMagic {
    /// Relative to the repository root. All patterns are, so this is accepted
    /// for compatibility only.
    pub top: bool,
    pub exclude: bool,
    pub icase: bool,
    /// `**` is special and wildcards never match '/'.
    pub glob: bool,
    /// No wildcard expansion at all.
    pub literal: bool,
}

#[derive(Debug, Clone)]
pub struct PathspecPattern {
    pub pattern: BString,
    pub magic: PathspecMagic,
    compiled: Option<WildmatchPattern>,
}

impl PathspecPattern {
    pub fn parse(input: &str) -> Result<Self, IndexError> {
        let mut magic = PathspecMagic::default();
        let body = if let Some(rest) = input.strip_prefix(":(") {
            let close = rest
                .find(')')
                .ok_or_else(|| IndexError::InvalidPathspec(format!("unclosed magic in '{input}'")))?;
            for word in rest[..close].split(',').map(str::trim) {
                match word {
                    "top" => magic.top = true,
                    "exclude" => magic.exclude = true,
                    "icase" => magic.icase = true,
                    "glob" => magic.glob = true,
                    "literal" => magic.literal = true,
                    "" => {}
                    other => {
                        return Err(IndexError::InvalidPathspec(format!(
                            "unknown pathspec magic '{other}'"
                        )))
                    }
                }
            }
            &rest[close + 1..]
        } else if let Some(rest) = input.strip_prefix(":!").or_else(|| input.strip_prefix(":^")) {
            magic.exclude = true;
            rest
        } else if let Some(rest) = input.strip_prefix(":/") {
            magic.top = true;
            rest
        } else {
            input
        };

        if magic.glob && magic.literal {
            return Err(IndexError::InvalidPathspec(
                "'glob' and 'literal' magic are incompatible".into(),
            ));
        }

        let body = body.strip_prefix("./").unwrap_or(body);
        let pattern = BString::from(body.trim_end_matches('/'));
        let compiled = (!magic.literal && has_glob_chars(pattern.as_bytes())).then(|| {
            let mut flags = WildmatchFlags::empty();
            if magic.glob {
                flags |= WildmatchFlags::PATHNAME;
            }
            if magic.icase {
                flags |= WildmatchFlags::CASEFOLD;
            }
            WildmatchPattern::new(pattern.as_bstr(), flags)
        });

        Ok(Self {
            pattern,
            magic,
            compiled,
        })
    }

    /// Whether `path` (or, for directories, something below it) is selected.
    pub fn matches(&self, path: &BStr, is_dir: bool) -> bool {
        if self.pattern.is_empty() {
            return true;
        }
        if let Some(glob) = &self.compiled {
            if glob.matches(path) {
                return true;
            }
            // A directory may still hold matching files.
            return is_dir && self.could_match_below(path);
        }

        let (path, pattern) = if self.magic.icase {
            (path.to_ascii_lowercase(), self.pattern.to_ascii_lowercase())
        } else {
            (path.to_vec(), self.pattern.to_vec())
        };
        if path == pattern {
            return true;
        }
        // `src` selects `src/...`; a directory `src` is selected by `src/a`.
        (path.starts_with(&pattern) && path.get(pattern.len()) == Some(&b'/'))
            || (is_dir && pattern.starts_with(&path) && pattern.get(path.len()) == Some(&b'/'))
    }

    /// The fixed leading directories of a glob, compared with a directory.
    fn could_match_below(&self, dir: &BStr) -> bool {
        let pat = self.pattern.as_bytes();
        let literal_len = pat
            .iter()
            .position(|&c| matches!(c, b'*' | b'?' | b'[' | b'\\'))
            .unwrap_or(pat.len());
        let fixed = &pat[..literal_len];
        let mut dir = dir.to_vec();
        dir.push(b'/');
        let n = dir.len().min(fixed.len());
        dir[..n] == fixed[..n]
    }
}

/// A set of pathspec patterns.
///
/// An empty set selects every path. Otherwise a path is selected when some
/// include pattern matches it and no exclude pattern does; a set of only
/// excludes selects everything they do not exclude.
#[derive(Debug, Clone, Default)]
pub struct Pathspec {
    patterns: Vec<PathspecPattern>,
}

impl Pathspec {
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self, IndexError> {
        let patterns = patterns
            .iter()
            .map(|p| PathspecPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Matches every path.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[PathspecPattern] {
        &self.patterns
    }

    pub fn matches(&self, path: &BStr, is_dir: bool) -> bool {
        let mut has_include = false;
        let mut included = false;
        for pat in &self.patterns {
            if pat.magic.exclude {
                // Excludes apply to the path itself, never to parents of it.
                if pat.matches(path, false) {
                    return false;
                }
            } else {
                has_include = true;
                included = included || pat.matches(path, is_dir);
            }
        }
        included || !has_include
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps(patterns: &[&str]) -> Pathspec {
        Pathspec::parse(patterns).unwrap()
    }

    fn m(spec: &Pathspec, path: &str) -> bool {
        spec.matches(BStr::new(path), false)
    }

    #[test]
    fn empty_matches_everything() {
        assert!(m(&Pathspec::all(), "any/thing"));
        assert!(Pathspec::all().is_empty());
    }

    #[test]
    fn plain_pattern_is_a_prefix() {
        let spec = ps(&["src"]);
        assert!(m(&spec, "src"));
        assert!(m(&spec, "src/main.rs"));
        assert!(m(&spec, "src/a/b.rs"));
        assert!(!m(&spec, "srcs/x"));
        assert!(!m(&spec, "lib/src"));
    }

    #[test]
    fn trailing_slash_and_dot_slash() {
        let spec = ps(&["./docs/"]);
        assert!(m(&spec, "docs/readme"));
        assert!(!m(&spec, "docsx"));
    }

    #[test]
    fn directories_on_the_way_to_a_pattern() {
        let spec = ps(&["a/b/c.txt"]);
        assert!(spec.matches(BStr::new("a/b"), true));
        assert!(!spec.matches(BStr::new("a/b"), false));
        assert!(!spec.matches(BStr::new("a/x"), true));

        let glob = ps(&["src/*.rs"]);
        assert!(glob.matches(BStr::new("src"), true));
        assert!(!glob.matches(BStr::new("lib"), true));
    }

    #[test]
    fn glob_patterns() {
        let spec = ps(&["src/*.rs"]);
        assert!(m(&spec, "src/main.rs"));
        assert!(m(&spec, "src/sub/main.rs"));
        assert!(!m(&spec, "lib/main.rs"));

        let spec = ps(&["*.txt"]);
        assert!(m(&spec, "a.txt"));
        assert!(m(&spec, "dir/b.txt"));
    }

    #[test]
    fn glob_magic_keeps_stars_in_one_directory() {
        let spec = ps(&[":(glob)src/*.rs"]);
        assert!(m(&spec, "src/main.rs"));
        assert!(!m(&spec, "src/sub/main.rs"));

        let deep = ps(&[":(glob)**/*.md"]);
        assert!(m(&deep, "README.md"));
        assert!(m(&deep, "docs/guide/intro.md"));
    }

    #[test]
    fn exclude_forms() {
        for exclude in [":(exclude)*.log", ":!*.log", ":^*.log"] {
            let spec = ps(&["dir", exclude]);
            assert!(m(&spec, "dir/a.txt"), "{exclude}");
            assert!(!m(&spec, "dir/a.log"), "{exclude}");
        }
        let spec = ps(&[":!*.log"]);
        assert!(m(&spec, "a.txt"));
        assert!(!m(&spec, "a.log"));
    }

    #[test]
    fn icase_and_literal() {
        let spec = ps(&[":(icase)README"]);
        assert!(m(&spec, "readme"));
        assert!(m(&spec, "ReadMe/x"));

        let spec = ps(&[":(literal)a*b"]);
        assert!(m(&spec, "a*b"));
        assert!(!m(&spec, "axb"));
    }

    #[test]
    fn bad_magic_is_rejected() {
        assert!(Pathspec::parse(&[":(bogus)x"]).is_err());
        assert!(Pathspec::parse(&[":(top"]).is_err());
        assert!(Pathspec::parse(&[":(glob,literal)x"]).is_err());
    }
}
