//! Glob matching with git's `wildmatch` rules.
//!
//! `?` and `*` never match `/` in [`WildmatchFlags::PATHNAME`] mode, while a
//! `**` that forms a whole path component matches any number of directories.

use bstr::{BStr, BString, ByteSlice};

bitflags::bitflags! {
    /// Flags controlling wildmatch behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WildmatchFlags: u32 {
        /// Case-insensitive matching.
        const CASEFOLD = 0x01;
        /// Wildcards do not match '/'.
        const PATHNAME = 0x02;
    }
}

/// A pattern paired with its flags, reusable across many paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildmatchPattern {
    pattern: BString,
    flags: WildmatchFlags,
}

impl WildmatchPattern {
    pub fn new(pattern: &BStr, flags: WildmatchFlags) -> Self {
        Self {
            pattern: pattern.to_owned(),
            flags,
        }
    }

    pub fn matches(&self, text: &BStr) -> bool {
        wildmatch(self.pattern.as_ref(), text, self.flags)
    }

    pub fn pattern(&self) -> &BStr {
        self.pattern.as_ref()
    }
}

/// Whether `pattern` contains any glob metacharacter.
pub fn has_glob_chars(pattern: &[u8]) -> bool {
    pattern.iter().any(|&c| matches!(c, b'*' | b'?' | b'[' | b'\\'))
}

/// Match `text` against `pattern`.
pub fn wildmatch(pattern: &BStr, text: &BStr, flags: WildmatchFlags) -> bool {
    match_from(pattern.as_bytes(), text.as_bytes(), flags)
}

fn fold(c: u8, flags: WildmatchFlags) -> u8 {
    if flags.contains(WildmatchFlags::CASEFOLD) {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

fn match_from(pat: &[u8], text: &[u8], flags: WildmatchFlags) -> bool {
    let pathname = flags.contains(WildmatchFlags::PATHNAME);
    let mut p = 0;
    let mut t = 0;

    while p < pat.len() {
        match pat[p] {
            b'?' => {
                if t >= text.len() || (pathname && text[t] == b'/') {
                    return false;
                }
                p += 1;
                t += 1;
            }
            b'*' => {
                let star_start = p;
                while p < pat.len() && pat[p] == b'*' {
                    p += 1;
                }
                let rest = &pat[p..];
                let double = p - star_start >= 2;
                let at_component_start = star_start == 0 || pat[star_start - 1] == b'/';

                if pathname && double && at_component_start {
                    if rest.is_empty() {
                        return true;
                    }
                    if rest[0] == b'/' {
                        // `**/` matches zero or more leading directories.
                        let after = &rest[1..];
                        let tail = &text[t..];
                        if match_from(after, tail, flags) {
                            return true;
                        }
                        return tail
                            .iter()
                            .enumerate()
                            .filter(|&(_, &c)| c == b'/')
                            .any(|(i, _)| match_from(after, &tail[i + 1..], flags));
                    }
                }

                if rest.is_empty() {
                    return !pathname || !text[t..].contains(&b'/');
                }
                for i in t..=text.len() {
                    if match_from(rest, &text[i..], flags) {
                        return true;
                    }
                    if i < text.len() && pathname && text[i] == b'/' {
                        return false;
                    }
                }
                return false;
            }
            b'[' => {
                let Some((matched, consumed)) = match_class(&pat[p..], text.get(t).copied(), flags)
                else {
                    // Unterminated class matches a literal '['.
                    if text.get(t) != Some(&b'[') {
                        return false;
                    }
                    p += 1;
                    t += 1;
                    continue;
                };
                if !matched {
                    return false;
                }
                p += consumed;
                t += 1;
            }
            b'\\' if p + 1 < pat.len() => {
                if t >= text.len() || fold(text[t], flags) != fold(pat[p + 1], flags) {
                    return false;
                }
                p += 2;
                t += 1;
            }
            c => {
                if t >= text.len() || fold(text[t], flags) != fold(c, flags) {
                    return false;
                }
                p += 1;
                t += 1;
            }
        }
    }

    t == text.len()
}

/// Evaluate a bracket expression at the start of `pat` against `ch`.
///
/// Returns `None` when the expression is not terminated, otherwise whether it
/// matched and how many pattern bytes it spans.
fn match_class(pat: &[u8], ch: Option<u8>, flags: WildmatchFlags) -> Option<(bool, usize)> {
    let mut i = 1;
    let negated = matches!(pat.get(i), Some(b'!') | Some(b'^'));
    if negated {
        i += 1;
    }

    let ch = ch.map(|c| fold(c, flags));
    let mut matched = false;
    let mut first = true;

    loop {
        let c = *pat.get(i)?;
        if c == b']' && !first {
            i += 1;
            break;
        }
        first = false;

        if c == b'[' && pat.get(i + 1) == Some(&b':') {
            if let Some(end) = pat[i + 2..].windows(2).position(|w| w == b":]") {
                let name = &pat[i + 2..i + 2 + end];
                if let Some(c) = ch {
                    matched |= class_contains(name, c);
                }
                i += 2 + end + 2;
                continue;
            }
        }

        let lo = if c == b'\\' {
            i += 1;
            *pat.get(i)?
        } else {
            c
        };
        i += 1;

        if pat.get(i) == Some(&b'-') && pat.get(i + 1).is_some_and(|&n| n != b']') {
            let mut hi = pat[i + 1];
            i += 2;
            if hi == b'\\' {
                hi = *pat.get(i)?;
                i += 1;
            }
            if let Some(c) = ch {
                let (lo, hi) = (fold(lo, flags), fold(hi, flags));
                matched |= lo <= c && c <= hi;
            }
        } else if ch == Some(fold(lo, flags)) {
            matched = true;
        }
    }

    let Some(c) = ch else {
        return Some((false, i));
    };
    if flags.contains(WildmatchFlags::PATHNAME) && c == b'/' {
        return Some((false, i));
    }
    Some((matched != negated, i))
}

fn class_contains(name: &[u8], c: u8) -> bool {
    match name {
        b"alnum" => c.is_ascii_alphanumeric(),
        b"alpha" => c.is_ascii_alphabetic(),
        b"digit" => c.is_ascii_digit(),
        b"lower" => c.is_ascii_lowercase(),
        b"upper" => c.is_ascii_uppercase(),
        b"space" => c.is_ascii_whitespace(),
        b"punct" => c.is_ascii_punctuation(),
        b"xdigit" => c.is_ascii_hexdigit(),
        _ => false,
    }
}
