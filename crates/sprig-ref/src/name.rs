use std::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::error::RefError;

/// A reference name that passed `check-ref-format` style validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefName(BString);

/// Pseudo-refs that live directly in the git directory.
const PSEUDO_REFS: &[&str] = &["HEAD", "MERGE_HEAD", "ORIG_HEAD", "FETCH_HEAD", "CHERRY_PICK_HEAD"];

impl RefName {
    pub fn new(name: impl Into<BString>) -> Result<Self, RefError> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    pub fn head() -> Self {
        Self(BString::from("HEAD"))
    }

    /// `refs/heads/<branch>`.
    pub fn branch(branch: &str) -> Result<Self, RefError> {
        Self::new(format!("refs/heads/{branch}"))
    }

    /// Name without the `refs/heads/`, `refs/tags/` or `refs/remotes/` prefix.
    pub fn short_name(&self) -> &BStr {
        ["refs/heads/", "refs/tags/", "refs/remotes/"]
            .iter()
            .find_map(|prefix| self.0.strip_prefix(prefix.as_bytes()))
            .unwrap_or(self.0.as_bytes())
            .as_bstr()
    }

    pub fn is_branch(&self) -> bool {
        self.0.starts_with(b"refs/heads/")
    }

    pub fn is_pseudo(&self) -> bool {
        PSEUDO_REFS.iter().any(|p| self.0 == p.as_bytes())
    }

    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    pub fn as_str(&self) -> &str {
        // Validation rejects nothing outside ASCII, but names from disk may
        // still carry arbitrary bytes.
        std::str::from_utf8(&self.0).unwrap_or("<non-utf8 ref>")
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<BStr> for RefName {
    fn as_ref(&self) -> &BStr {
        self.0.as_bstr()
    }
}

fn validate(name: &[u8]) -> Result<(), RefError> {
    let invalid = |why: &str| {
        Err(RefError::InvalidName(format!(
            "'{}': {why}",
            name.as_bstr()
        )))
    };

    if name.is_empty() {
        return invalid("empty");
    }
    if name == b"@" {
        return invalid("'@' alone is reserved");
    }
    if let Some(&c) = name
        .iter()
        .find(|&&c| c < 0x20 || c == 0x7f || b" ~^:?*[\\".contains(&c))
    {
        return invalid(&format!("forbidden character {:?}", c as char));
    }
    if name.starts_with(b"/") || name.ends_with(b"/") || name.ends_with(b".") {
        return invalid("bad leading or trailing character");
    }
    for bad in [&b".."[..], b"//", b"@{"] {
        if name.find(bad).is_some() {
            return invalid(&format!("contains '{}'", bad.as_bstr()));
        }
    }
    for component in name.split_str("/") {
        if component.starts_with(b".") || component.ends_with(b".lock") {
            return invalid("component starts with '.' or ends with '.lock'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["HEAD", "MERGE_HEAD", "refs/heads/main", "refs/tags/v1.0", "refs/heads/feature/x-y"] {
            assert!(RefName::new(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "",
            "@",
            "refs/heads/a..b",
            "refs/heads/a b",
            "refs/heads/a~1",
            "refs/heads/a^",
            "refs/heads/",
            "/refs/heads/a",
            "refs//heads",
            "refs/heads/x.lock",
            "refs/heads/.hidden",
            "refs/heads/a@{1}",
            "refs/heads/end.",
        ] {
            assert!(RefName::new(name).is_err(), "{name}");
        }
    }

    #[test]
    fn short_names() {
        assert_eq!(RefName::new("refs/heads/main").unwrap().short_name(), "main");
        assert_eq!(RefName::new("refs/tags/v1").unwrap().short_name(), "v1");
        assert_eq!(RefName::head().short_name(), "HEAD");
        assert!(RefName::head().is_pseudo());
        assert!(RefName::branch("dev").unwrap().is_branch());
    }
}
