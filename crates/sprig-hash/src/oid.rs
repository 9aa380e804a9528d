use std::fmt;
use std::str::FromStr;

use crate::{hex, HashError};

/// Length of a SHA-1 object id in bytes.
pub const OID_LEN: usize = 20;

/// Length of a SHA-1 object id in hex digits.
pub const OID_HEX_LEN: usize = 40;

/// Content address of a git object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; OID_LEN]);

impl ObjectId {
    /// The all-zero id, used for "no object".
    pub const NULL: ObjectId = ObjectId([0; OID_LEN]);

    pub const fn from_raw(bytes: [u8; OID_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, which must be exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        let raw: [u8; OID_LEN] = bytes
            .try_into()
            .map_err(|_| HashError::InvalidHashLength(bytes.len()))?;
        Ok(Self(raw))
    }

    /// Parse a full 40-digit hex id.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let mut raw = [0u8; OID_LEN];
        hex::decode_into(hex, &mut raw)?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0; OID_LEN]
    }

    pub fn to_hex(&self) -> String {
        hex::to_hex(&self.0)
    }

    /// Abbreviated hex form (7 digits, like `git log --oneline`).
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Whether the hex form of this id begins with `prefix` (case-insensitive).
    pub fn starts_with_hex(&self, prefix: &str) -> bool {
        prefix.len() <= OID_HEX_LEN
            && self
                .to_hex()
                .as_bytes()
                .iter()
                .zip(prefix.bytes())
                .all(|(a, b)| *a == b.to_ascii_lowercase())
    }

    /// Relative path of the loose object file: `xx/yyyy...`.
    pub fn loose_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn hex_forms() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(oid.to_string(), EMPTY_BLOB);
        assert_eq!(oid.short_hex(), "e69de29");
        assert_eq!(oid.loose_path(), "e6/9de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        assert_eq!(format!("{oid:?}"), "ObjectId(e69de29b)");
    }

    #[test]
    fn prefix_matching() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert!(oid.starts_with_hex("e69d"));
        assert!(oid.starts_with_hex("E69D"));
        assert!(!oid.starts_with_hex("e69e"));
        assert!(oid.starts_with_hex(EMPTY_BLOB));
    }

    #[test]
    fn null_and_lengths() {
        assert!(ObjectId::NULL.is_null());
        assert!(ObjectId::from_bytes(&[1; 19]).is_err());
        assert!(ObjectId::from_hex("e69de29").is_err());
        assert!(!ObjectId::from_bytes(&[1; 20]).unwrap().is_null());
    }

    #[test]
    fn ordering_follows_bytes() {
        let a = ObjectId::from_raw([0x10; 20]);
        let b = ObjectId::from_raw([0x20; 20]);
        assert!(a < b);
    }
}
