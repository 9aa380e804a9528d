//! Git-style configuration for sprig.
//!
//! Config files use git's INI dialect. A [`ConfigSet`] layers the system,
//! global and repository files with `GIT_CONFIG_COUNT` environment entries
//! and `-c` overrides; later layers win.

mod env;
mod error;
pub mod file;
pub mod parse;
mod set;

use std::fmt;

use bstr::{BStr, BString, ByteSlice};

pub use env::env_overrides;
pub use error::ConfigError;
pub use file::ConfigFile;
pub use set::ConfigSet;

/// Where a value came from, in increasing precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigScope {
    System,
    Global,
    Local,
    /// `-c key=value` and `GIT_CONFIG_COUNT` entries.
    Command,
}

/// `section[.subsection].name`, with section and name lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub section: BString,
    /// Case is significant.
    pub subsection: Option<BString>,
    pub name: BString,
}

impl ConfigKey {
    /// The subsection is everything between the first and the last dot, so
    /// it may itself contain dots.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidKey(key.to_string());
        let (section, rest) = key.trim().split_once('.').ok_or_else(invalid)?;
        let (subsection, name) = match rest.rsplit_once('.') {
            Some((sub, name)) => (Some(BString::from(sub)), name),
            None => (None, rest),
        };
        let valid_name = |s: &str| {
            !s.is_empty() && s.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'-')
        };
        if !valid_name(section) || !valid_name(name) {
            return Err(invalid());
        }
        Ok(Self {
            section: section.to_ascii_lowercase().into(),
            subsection,
            name: name.to_ascii_lowercase().into(),
        })
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subsection {
            Some(sub) => write!(f, "{}.{}.{}", self.section, sub, self.name),
            None => write!(f, "{}.{}", self.section, self.name),
        }
    }
}

/// One `key = value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: ConfigKey,
    /// `None` for a bare `key` line, which means boolean true.
    pub value: Option<BString>,
    pub scope: ConfigScope,
}

/// Interpret a boolean value the way git does.
///
/// A bare key is true and an empty value is false. Otherwise accepts
/// `true/yes/on/false/no/off` in any case, or an integer (non-zero is true).
pub fn parse_bool(value: Option<&BStr>) -> Option<bool> {
    let Some(value) = value else {
        return Some(true);
    };
    let value = value.trim().to_ascii_lowercase();
    match value.as_slice() {
        b"" | b"false" | b"no" | b"off" => Some(false),
        b"true" | b"yes" | b"on" => Some(true),
        digits => digits.to_str().ok()?.parse::<i64>().ok().map(|n| n != 0),
    }
}
