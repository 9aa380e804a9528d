//! The `"<type> <size>\0"` prefix of every stored object.

use crate::{ObjectError, ObjectType};

/// Parse an object header, returning `(type, content size, header length)`.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::InvalidHeader("missing NUL terminator".into()))?;
    let header = &data[..nul];
    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::InvalidHeader("missing space".into()))?;

    let obj_type = ObjectType::from_bytes(&header[..space])?;
    let size = std::str::from_utf8(&header[space + 1..])
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            ObjectError::InvalidHeader(format!(
                "invalid size: {}",
                String::from_utf8_lossy(&header[space + 1..])
            ))
        })?;

    Ok((obj_type, size, nul + 1))
}

/// Build the header bytes for an object of the given type and size.
pub fn write_header(obj_type: ObjectType, size: usize) -> Vec<u8> {
    format!("{} {}\0", obj_type, size).into_bytes()
}
