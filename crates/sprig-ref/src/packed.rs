//! Read access to `packed-refs`.
//!
//! ```text
//! # pack-refs with: peeled fully-peeled sorted
//! <hex> <refname>
//! ^<hex>          peeled target of the annotated tag above
//! ```

use std::fs;
use std::io;
use std::path::Path;

use bstr::ByteSlice;
use sprig_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRef {
    pub name: RefName,
    pub oid: ObjectId,
    pub peeled: Option<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct PackedRefs {
    refs: Vec<PackedRef>,
}

impl PackedRefs {
    pub fn parse(data: &[u8], path: &Path) -> Result<Self, RefError> {
        let parse_err = |line: usize, reason: &str| RefError::Parse {
            path: path.to_path_buf(),
            reason: format!("line {}: {reason}", line + 1),
        };

        let mut refs: Vec<PackedRef> = Vec::new();
        for (n, line) in data.lines().enumerate() {
            if line.is_empty() || line.starts_with(b"#") {
                continue;
            }
            if let Some(hex) = line.strip_prefix(b"^") {
                let hex = hex.to_str().map_err(|_| parse_err(n, "non-utf8 peeled id"))?;
                let peeled = ObjectId::from_hex(hex.trim()).map_err(|e| parse_err(n, &e.to_string()))?;
                let last = refs
                    .last_mut()
                    .ok_or_else(|| parse_err(n, "peeled line without a ref"))?;
                last.peeled = Some(peeled);
                continue;
            }
            let line = line.to_str().map_err(|_| parse_err(n, "non-utf8 line"))?;
            let (hex, name) = line
                .split_once(' ')
                .ok_or_else(|| parse_err(n, "expected '<id> <name>'"))?;
            refs.push(PackedRef {
                name: RefName::new(name.trim())?,
                oid: ObjectId::from_hex(hex).map_err(|e| parse_err(n, &e.to_string()))?,
                peeled: None,
            });
        }
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { refs })
    }

    /// Load `<git_dir>/packed-refs`; a missing file is empty.
    pub fn load(git_dir: &Path) -> Result<Self, RefError> {
        let path = git_dir.join("packed-refs");
        match fs::read(&path) {
            Ok(data) => Self::parse(&data, &path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(RefError::IoPath { path, source }),
        }
    }

    pub fn find(&self, name: &RefName) -> Option<&PackedRef> {
        self.refs
            .binary_search_by(|r| r.name.cmp(name))
            .ok()
            .map(|i| &self.refs[i])
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "1111111111111111111111111111111111111111";
    const B: &str = "2222222222222222222222222222222222222222";
    const C: &str = "3333333333333333333333333333333333333333";

    #[test]
    fn parses_refs_and_peeled_lines() {
        let data = format!(
            "# pack-refs with: peeled fully-peeled sorted\n{B} refs/tags/v1\n^{C}\n{A} refs/heads/main\n"
        );
        let packed = PackedRefs::parse(data.as_bytes(), Path::new("packed-refs")).unwrap();
        assert_eq!(packed.len(), 2);

        let main = packed.find(&RefName::new("refs/heads/main").unwrap()).unwrap();
        assert_eq!(main.oid.to_hex(), A);
        assert_eq!(main.peeled, None);

        let tag = packed.find(&RefName::new("refs/tags/v1").unwrap()).unwrap();
        assert_eq!(tag.oid.to_hex(), B);
        assert_eq!(tag.peeled.map(|p| p.to_hex()), Some(C.to_string()));

        assert!(packed.find(&RefName::new("refs/heads/other").unwrap()).is_none());
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let err = PackedRefs::parse(b"# header\nnot-a-ref-line\n", Path::new("p")).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        assert!(PackedRefs::parse(format!("^{A}\n").as_bytes(), Path::new("p")).is_err());
    }
}
