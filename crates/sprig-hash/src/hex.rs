//! Lowercase hex encoding for object ids.

use crate::HashError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Hex-encode `bytes` to a new `String`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decode `hex` into `buf`; the input must be exactly `buf.len() * 2` digits.
pub fn decode_into(hex: &str, buf: &mut [u8]) -> Result<(), HashError> {
    let hex = hex.as_bytes();
    if hex.len() != buf.len() * 2 {
        return Err(HashError::InvalidHexLength {
            expected: buf.len() * 2,
            actual: hex.len(),
        });
    }
    for (i, out) in buf.iter_mut().enumerate() {
        let digit = |pos: usize| {
            nibble(hex[pos]).ok_or(HashError::InvalidHex {
                position: pos,
                character: hex[pos] as char,
            })
        };
        *out = (digit(i * 2)? << 4) | digit(i * 2 + 1)?;
    }
    Ok(())
}

/// Whether `s` is a non-empty string of hex digits.
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| nibble(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode() {
        assert_eq!(to_hex(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn decode_reports_position() {
        let mut buf = [0u8; 2];
        decode_into("AbCd", &mut buf).unwrap();
        assert_eq!(buf, [0xab, 0xcd]);

        let err = decode_into("abzd", &mut buf).unwrap_err();
        assert!(matches!(err, HashError::InvalidHex { position: 2, character: 'z' }));

        let err = decode_into("abc", &mut buf).unwrap_err();
        assert!(matches!(err, HashError::InvalidHexLength { expected: 4, actual: 3 }));
    }

    #[test]
    fn hex_predicate() {
        assert!(is_hex("deadBEEF"));
        assert!(!is_hex(""));
        assert!(!is_hex("main"));
    }
}
