use bstr::{BString, ByteSlice};
use sprig_hash::ObjectId;
use sprig_utils::Signature;

use crate::{ObjectError, ObjectType};

/// An annotated tag. Only what revision resolution needs to peel it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub target: ObjectId,
    pub target_type: ObjectType,
    pub name: BString,
    pub tagger: Option<Signature>,
    pub message: BString,
}

impl Tag {
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (headers, message) = match data.find(b"\n\n") {
            Some(i) => (&data[..i], &data[i + 2..]),
            None => (data, &b""[..]),
        };

        let mut target = None;
        let mut target_type = None;
        let mut name = None;
        let mut tagger = None;
        for line in headers.lines() {
            let Some((key, value)) = line.split_once_str(" ") else {
                continue;
            };
            match key {
                b"object" => {
                    let hex = std::str::from_utf8(value)
                        .map_err(|_| ObjectError::InvalidHeader("non-UTF-8 object id".into()))?;
                    target = Some(ObjectId::from_hex(hex)?);
                }
                b"type" => target_type = Some(ObjectType::from_bytes(value)?),
                b"tag" => name = Some(BString::from(value)),
                b"tagger" => tagger = Some(Signature::parse(value.as_bstr())?),
                _ => {}
            }
        }

        let missing = |field| ObjectError::MissingField { kind: "tag", field };
        Ok(Self {
            target: target.ok_or_else(|| missing("object"))?,
            target_type: target_type.ok_or_else(|| missing("type"))?,
            name: name.ok_or_else(|| missing("tag"))?,
            tagger,
            message: BString::from(message),
        })
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = format!(
            "object {}\ntype {}\ntag {}\n",
            self.target, self.target_type, self.name
        )
        .into_bytes();
        if let Some(tagger) = &self.tagger {
            out.extend_from_slice(b"tagger ");
            out.extend_from_slice(&tagger.to_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}
