//! Typed views over decoded response documents
//!
//! Each type is built from a decoded [`Node`] tree. Absent elements become
//! `None` rather than errors: the service adds fields over time and older
//! fields disappear for private certificates.

use digiprove_core::files::FileTable;
use digiprove_core::xml::Node;

fn text(node: &Node, name: &str) -> Option<String> {
    node.get_text(name)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// =============================================================================
// CERTIFY
// =============================================================================

/// Successful certification receipt
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertifyReceipt {
    /// Service result code (`"0"` on success)
    pub result_code: String,
    /// Human-readable result description
    pub result: String,
    /// Id of the issued certificate, e.g. `P123456`
    pub certificate_id: Option<String>,
    /// Fingerprint of the primary content as recorded on the certificate
    pub digital_fingerprint: Option<String>,
    /// UTC timestamp of certification
    pub utc_date_and_time: Option<String>,
    /// URL where the certificate can be viewed
    pub certificate_url: Option<String>,
    /// Current subscription type for the account
    pub subscription_type: Option<String>,
    /// Current subscription expiry, if any
    pub subscription_expiry: Option<String>,
    /// API key issued when one was requested
    pub api_key: Option<String>,
    /// Digitally-signed certificate file (when requested)
    pub certificate_file: Option<String>,
    /// Filename for the certificate file
    pub certificate_filename: Option<String>,
    /// Files covered by the certification, as submitted after de-duplication
    pub content_files: FileTable,
}

impl CertifyReceipt {
    /// Build a receipt from a decoded `digiprove_certify_response` body
    pub fn from_node(node: &Node) -> Self {
        Self {
            result_code: text(node, "result_code").unwrap_or_default(),
            result: text(node, "result").unwrap_or_default(),
            certificate_id: text(node, "certificate_id"),
            digital_fingerprint: text(node, "digital_fingerprint"),
            utc_date_and_time: text(node, "utc_date_and_time"),
            certificate_url: text(node, "certificate_url"),
            subscription_type: text(node, "subscription_type"),
            subscription_expiry: text(node, "subscription_expiry"),
            api_key: text(node, "api_key"),
            certificate_file: text(node, "certificate_file"),
            certificate_filename: text(node, "certificate_filename"),
            content_files: FileTable::new(),
        }
    }
}

// =============================================================================
// VERIFY
// =============================================================================

/// A file referenced by a matched certificate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileMatch {
    pub filename: Option<String>,
    pub digital_fingerprint: Option<String>,
}

/// One certified document matching the verified content
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentMatch {
    pub certificate_id: Option<String>,
    /// Fingerprint of the certificate's primary content (not necessarily the
    /// content that was submitted)
    pub digital_fingerprint: Option<String>,
    pub utc_date_and_time: Option<String>,
    pub certificate_url: Option<String>,
    pub published_url: Option<String>,
    pub original_document_id: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    /// Files referenced by this certificate
    pub files: Vec<FileMatch>,
}

impl DocumentMatch {
    fn from_node(node: &Node) -> Self {
        let mut files = Vec::new();
        for i in 0.. {
            let Some(file) = node.get(&format!("file_{i}")) else {
                break;
            };
            files.push(FileMatch {
                filename: text(file, "filename"),
                digital_fingerprint: text(file, "digital_fingerprint"),
            });
        }
        Self {
            certificate_id: text(node, "certificate_id"),
            digital_fingerprint: text(node, "digital_fingerprint"),
            utc_date_and_time: text(node, "utc_date_and_time"),
            certificate_url: text(node, "certificate_url"),
            published_url: text(node, "published_url"),
            original_document_id: text(node, "original_document_id"),
            version: text(node, "version"),
            title: text(node, "title"),
            authors: text(node, "authors"),
            files,
        }
    }
}

/// Outcome of a verification attempt
///
/// Verification never returns an error for "content is not authentic": the
/// result-code taxonomy carries every outcome, including local failures
/// (1xx) and completed-but-negative verifications (210/211/220).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Result code (see [`verify_code`](digiprove_core::verify_code))
    pub result_code: String,
    /// Human-readable result description
    pub result: String,
    /// Further information, when present
    pub notes: Option<String>,
    /// Number of times this exact content has been certified; supplied only
    /// for fingerprint-only searches
    pub instance_count: Option<u32>,
    /// Fingerprint of the submitted content
    pub content_fingerprint: Option<String>,
    /// Matching certified documents (at most one when a certificate id was
    /// supplied; empty for anonymous requests)
    pub documents: Vec<DocumentMatch>,
}

impl VerifyOutcome {
    /// An outcome carrying only a code and description (local or transport
    /// failures, and responses without a decodable body)
    pub fn failure(result_code: &str, result: impl Into<String>) -> Self {
        Self {
            result_code: result_code.to_string(),
            result: result.into(),
            ..Self::default()
        }
    }

    /// Build an outcome from a decoded `digiprove_verify_response` body
    pub fn from_node(node: &Node) -> Self {
        let mut documents = Vec::new();
        for i in 0.. {
            let Some(doc) = node.get(&format!("document_{i}")) else {
                break;
            };
            documents.push(DocumentMatch::from_node(doc));
        }
        Self {
            result_code: text(node, "result_code").unwrap_or_default(),
            result: text(node, "result").unwrap_or_default(),
            notes: text(node, "notes"),
            instance_count: text(node, "instance_count").and_then(|s| s.parse().ok()),
            content_fingerprint: text(node, "content_fingerprint"),
            documents,
        }
    }
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// Response to a register, update, or sync operation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountInfo {
    /// Service result code (`"0"` on success)
    pub result_code: String,
    /// Human-readable result description
    pub result: String,
    /// API key issued or renewed by the server
    pub api_key: Option<String>,
    /// Current subscription type
    pub subscription_type: Option<String>,
    /// Current subscription expiry, if any
    pub subscription_expiry: Option<String>,
}

impl AccountInfo {
    /// Build account info from a decoded response body
    pub fn from_node(node: &Node) -> Self {
        Self {
            result_code: text(node, "result_code").unwrap_or_default(),
            result: text(node, "result").unwrap_or_default(),
            api_key: text(node, "api_key"),
            subscription_type: text(node, "subscription_type"),
            subscription_expiry: text(node, "subscription_expiry"),
        }
    }
}
