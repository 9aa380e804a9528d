use bstr::{BStr, BString, ByteSlice};
use sprig_hash::ObjectId;
use sprig_utils::Signature;

use crate::ObjectError;

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: ObjectId,
    /// Parents in order; the first one is the mainline.
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Optional `encoding` header.
    pub encoding: Option<BString>,
    /// Headers this crate does not interpret (gpgsig, mergetag, ...), with
    /// continuation lines joined by '\n'.
    pub extra_headers: Vec<(BString, BString)>,
    /// Everything after the blank line that ends the headers.
    pub message: BString,
}

impl Commit {
    /// Parse commit content (no object header).
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut encoding = None;
        let mut extra_headers = Vec::new();

        let mut pos = 0;
        while pos < data.len() && data[pos] != b'\n' {
            let (line, mut next) = next_line(data, pos);
            let Some((key, value)) = line.split_once_str(" ") else {
                pos = next;
                continue;
            };

            match key {
                b"tree" => tree = Some(parse_id(value)?),
                b"parent" => parents.push(parse_id(value)?),
                b"author" => author = Some(Signature::parse(value.as_bstr())?),
                b"committer" => committer = Some(Signature::parse(value.as_bstr())?),
                b"encoding" => encoding = Some(BString::from(value)),
                _ => {
                    let mut joined = value.to_vec();
                    while data.get(next) == Some(&b' ') {
                        let (cont, after) = next_line(data, next);
                        joined.push(b'\n');
                        joined.extend_from_slice(&cont[1..]);
                        next = after;
                    }
                    extra_headers.push((BString::from(key), BString::from(joined)));
                }
            }
            pos = next;
        }

        let missing = |field| ObjectError::MissingField {
            kind: "commit",
            field,
        };
        Ok(Self {
            tree: tree.ok_or_else(|| missing("tree"))?,
            parents,
            author: author.ok_or_else(|| missing("author"))?,
            committer: committer.ok_or_else(|| missing("committer"))?,
            encoding,
            extra_headers,
            message: BString::from(data.get(pos + 1..).unwrap_or_default()),
        })
    }

    /// Serialize commit content (no object header).
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.message.len());
        let mut header = |key: &[u8], value: &[u8]| {
            out.extend_from_slice(key);
            out.push(b' ');
            out.extend_from_slice(&value.replace(b"\n", b"\n "));
            out.push(b'\n');
        };

        header(b"tree", self.tree.to_hex().as_bytes());
        for parent in &self.parents {
            header(b"parent", parent.to_hex().as_bytes());
        }
        header(b"author", &self.author.to_bytes());
        header(b"committer", &self.committer.to_bytes());
        if let Some(enc) = &self.encoding {
            header(b"encoding", enc);
        }
        for (key, value) in &self.extra_headers {
            header(key, value);
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Committer timestamp, the key for date-ordered walks.
    pub fn commit_time(&self) -> i64 {
        self.committer.date.timestamp
    }

    /// First line of the message.
    pub fn summary(&self) -> &BStr {
        let msg = self.message.trim_start_with(|c| c == '\n');
        msg.lines().next().unwrap_or_default().as_bstr()
    }
}

/// Returns the line starting at `pos` (without '\n') and the offset after it.
fn next_line(data: &[u8], pos: usize) -> (&[u8], usize) {
    match data[pos..].find_byte(b'\n') {
        Some(i) => (&data[pos..pos + i], pos + i + 1),
        None => (&data[pos..], data.len()),
    }
}

fn parse_id(value: &[u8]) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader("non-UTF-8 object id".into()))?;
    Ok(ObjectId::from_hex(hex)?)
}
