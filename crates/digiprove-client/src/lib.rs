//! Blocking client for the Digiprove content certification service
//!
//! This crate provides:
//! - Endpoint configuration
//! - A pluggable HTTP transport (with a default blocking implementation)
//! - Response decoding into typed receipts and outcomes
//! - The five-operation client: certify, verify, register, update, sync

pub mod client;
pub mod config;
pub mod response;
pub mod transport;

pub use client::{Certification, ClientError, OperationClient};
pub use config::ClientConfig;
pub use response::{AccountInfo, CertifyReceipt, DocumentMatch, FileMatch, VerifyOutcome};
pub use transport::{HttpTransport, Transport, TransportError};
