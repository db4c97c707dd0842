//! Digiprove Protocol Core
//!
//! This crate provides the protocol layer for the Digiprove content
//! notarization service: content fingerprinting, credential handling, XML
//! request construction with the service's escaping rules, and the recursive
//! XML-to-map response decoder.
//!
//! # Modules
//!
//! - [`types`]: Credentials, content, metadata, and result-code types
//! - [`fingerprint`]: SHA-256 content fingerprinting
//! - [`xml`]: Escaping rules and the response decoder
//! - [`files`]: Content-file fingerprint table with de-duplication
//! - [`request`]: XML request builders for the five service operations
//! - [`error`]: Error types

pub mod error;
pub mod files;
pub mod fingerprint;
pub mod request;
pub mod types;
pub mod xml;

#[cfg(test)]
mod test_vectors;

pub use error::{Error, Result};
pub use types::*;
