/// Errors from parsing or computing object ids.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hex character '{character}' at position {position}")]
    InvalidHex { position: usize, character: char },

    #[error("invalid hex length: expected {expected}, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("invalid hash length: expected 20 bytes, got {0}")]
    InvalidHashLength(usize),

    #[error("SHA-1 collision attack detected")]
    Sha1Collision,
}
