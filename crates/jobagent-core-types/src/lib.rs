//! Core types shared across the job agent facilities
//!
//! This crate provides foundational types used by error handling,
//! logging and persistence:
//!
//! - **Sensitive data**: `Sensitive<T>` marker for automatic redaction of
//!   password hashes, access tokens and encryption keys
//! - **Schema constants**: Canonical log field keys and event names

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;
