//! Parser for git's config dialect.
//!
//! ```text
//! # comment
//! [core]
//!     bare = false
//! [remote "origin"]      ; subsection, case kept
//!     url = "a value" # trailing comment
//! [user.name-style]      ; deprecated dotted subsection, lowercased
//! ```

use bstr::{BString, ByteSlice};

use crate::{ConfigError, ConfigKey};

/// A `key = value` line with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub key: ConfigKey,
    pub value: Option<BString>,
    pub line: usize,
}

const BOM: &[u8] = b"\xef\xbb\xbf";

pub fn parse_config(input: &[u8], file: &str) -> Result<Vec<ParsedEntry>, ConfigError> {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut parser = Parser {
        input,
        pos: 0,
        line: 1,
        file,
    };
    let mut section: Option<(BString, Option<BString>)> = None;
    let mut entries = Vec::new();

    loop {
        parser.skip_blank();
        let Some(c) = parser.peek() else { break };
        match c {
            b'\n' => parser.bump(),
            b'#' | b';' => parser.skip_line(),
            b'[' => {
                section = Some(parser.section_header()?);
                parser.end_of_line()?;
            }
            c if c.is_ascii_alphabetic() => {
                let line = parser.line;
                let Some((sec, sub)) = &section else {
                    return Err(parser.error("key outside of any section"));
                };
                let name = parser.name();
                parser.skip_blank();
                let value = match parser.peek() {
                    Some(b'=') => {
                        parser.bump();
                        Some(parser.value()?)
                    }
                    None | Some(b'\n') | Some(b'#') | Some(b';') => {
                        parser.skip_line();
                        None
                    }
                    Some(_) => return Err(parser.error("expected '=' after key")),
                };
                entries.push(ParsedEntry {
                    key: ConfigKey {
                        section: sec.clone(),
                        subsection: sub.clone(),
                        name,
                    },
                    value,
                    line,
                });
            }
            _ => return Err(parser.error("unexpected character")),
        }
    }
    Ok(entries)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    file: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) {
        if self.peek() == Some(b'\n') {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn error(&self, message: &str) -> ConfigError {
        ConfigError::Parse {
            file: self.file.to_string(),
            line: self.line,
            message: message.to_string(),
        }
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.bump();
        }
    }

    /// Skip to just past the next newline.
    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            self.bump();
            if c == b'\n' {
                break;
            }
        }
    }

    fn end_of_line(&mut self) -> Result<(), ConfigError> {
        self.skip_blank();
        match self.peek() {
            None => Ok(()),
            Some(b'\n' | b'#' | b';') => {
                self.skip_line();
                Ok(())
            }
            Some(_) => Err(self.error("trailing garbage after section header")),
        }
    }

    fn name(&mut self) -> BString {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'-') {
            self.pos += 1;
        }
        self.input[start..self.pos].to_ascii_lowercase().into()
    }

    fn section_header(&mut self) -> Result<(BString, Option<BString>), ConfigError> {
        self.bump(); // '['
        let input = self.input;
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'-' || c == b'.') {
            self.pos += 1;
        }
        let raw_name = &input[start..self.pos];
        if raw_name.is_empty() {
            return Err(self.error("empty section name"));
        }

        let subsection = match self.peek() {
            Some(b']') => {
                self.bump();
                // `[section.sub]` is the old spelling of `[section "sub"]`.
                return Ok(match raw_name.split_once_str(".") {
                    Some((sec, sub)) => (sec.to_ascii_lowercase().into(), Some(sub.to_ascii_lowercase().into())),
                    None => (raw_name.to_ascii_lowercase().into(), None),
                });
            }
            Some(b' ' | b'\t') => {
                self.skip_blank();
                if self.peek() != Some(b'"') {
                    return Err(self.error("expected '\"' before subsection"));
                }
                self.bump();
                let mut sub = Vec::new();
                loop {
                    match self.peek() {
                        None | Some(b'\n') => return Err(self.error("unterminated subsection")),
                        Some(b'"') => {
                            self.bump();
                            break;
                        }
                        Some(b'\\') => {
                            self.bump();
                            match self.peek() {
                                None | Some(b'\n') => return Err(self.error("unterminated subsection")),
                                Some(c) => {
                                    sub.push(c);
                                    self.bump();
                                }
                            }
                        }
                        Some(c) => {
                            sub.push(c);
                            self.bump();
                        }
                    }
                }
                Some(BString::from(sub))
            }
            _ => return Err(self.error("bad section header")),
        };
        if raw_name.contains(&b'.') {
            return Err(self.error("dotted section name with a quoted subsection"));
        }
        if self.peek() != Some(b']') {
            return Err(self.error("expected ']' after subsection"));
        }
        self.bump();
        Ok((raw_name.to_ascii_lowercase().into(), subsection))
    }

    /// Value after '=': surrounding whitespace trimmed, quotes removed,
    /// escapes decoded, `\` + newline continues the value on the next line.
    fn value(&mut self) -> Result<BString, ConfigError> {
        self.skip_blank();
        let mut out = Vec::new();
        let mut quoted = false;
        // Length of `out` excluding unquoted trailing whitespace.
        let mut keep = 0;
        loop {
            let Some(c) = self.peek() else { break };
            match c {
                b'\n' => {
                    if quoted {
                        return Err(self.error("unterminated quoted value"));
                    }
                    self.bump();
                    break;
                }
                b'#' | b';' if !quoted => {
                    self.skip_line();
                    break;
                }
                b'"' => {
                    quoted = !quoted;
                    self.bump();
                    keep = out.len();
                }
                b'\\' => {
                    self.bump();
                    let decoded = match self.peek() {
                        Some(b'\n') => {
                            self.bump();
                            continue;
                        }
                        Some(b'\r') if self.input.get(self.pos + 1) == Some(&b'\n') => {
                            self.bump();
                            self.bump();
                            continue;
                        }
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',
                        Some(b'b') => 0x08,
                        Some(b'\\') => b'\\',
                        Some(b'"') => b'"',
                        _ => return Err(self.error("bad escape in value")),
                    };
                    self.bump();
                    out.push(decoded);
                    keep = out.len();
                }
                b' ' | b'\t' | b'\r' if !quoted => {
                    out.push(c);
                    self.bump();
                }
                _ => {
                    out.push(c);
                    self.bump();
                    keep = out.len();
                }
            }
        }
        if quoted {
            return Err(self.error("unterminated quoted value"));
        }
        out.truncate(keep);
        Ok(out.into())
    }
}
