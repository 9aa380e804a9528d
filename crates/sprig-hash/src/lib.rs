//! Object identity for sprig: 20-byte SHA-1 ids, hex codecs and hashing.

pub mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;
