//! Checksum validation for migrations
//!
//! The SHA-256 of a unit's SQL is stored when it is applied; a later
//! mismatch means the unit was edited after release.

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
