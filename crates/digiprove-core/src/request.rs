//! XML request builders for the five service operations
//!
//! Each builder assembles one request document from validated inputs.
//! Builders fail with an explicit error, never a panic, when authentication
//! cannot be assembled; they perform no I/O and no network activity.
//!
//! Shared conventions:
//! - `<user_agent>` always carries the SDK identity plus an optional escaped
//!   caller suffix.
//! - `<api_key>` is sent raw (server-issued tokens are opaque-safe);
//!   `<password>` is escaped.
//! - Boolean flags render as literal `Yes`/`No` text nodes.

use crate::error::{Error, Result};
use crate::files::FileTable;
use crate::types::{Credentials, DocumentTracking, Metadata, keys};
use crate::xml;

/// SDK identity always sent in `<user_agent>`
pub const SDK_USER_AGENT: &str = concat!("Rust / Digiprove SDK ", env!("CARGO_PKG_VERSION"));

// =============================================================================
// OPTION STRUCTS
// =============================================================================

/// Options for a certify request
#[derive(Clone, Debug, Default)]
pub struct CertifyOptions {
    /// Free-text label describing the content, e.g. "Medical Record"
    pub content_type: String,
    /// Open metadata rendered as sibling elements
    pub metadata: Option<Metadata>,
    /// Document tracking block (`original_document_id` mandatory)
    pub document_tracking: Option<DocumentTracking>,
    /// Caller software identity appended to the SDK user agent
    pub user_agent: String,
    /// URL where the content is published, if any
    pub content_url: String,
    /// Whether the certifying page should link back to `content_url`
    pub linkback: bool,
    /// Obscure the certificate URL with a guid
    pub obscure_url: bool,
    /// Return the digitally-signed certificate file
    pub return_dp_cert: bool,
    /// Email a confirmation to the account holder
    pub email_confirmation: bool,
    /// Send the full content for retention instead of only the fingerprint
    pub save_content: bool,
}

/// Account profile fields shared by register and update
#[derive(Clone, Debug, Default)]
pub struct AccountProfile {
    /// Email address (activation link is sent here on registration)
    pub email_address: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Show the user's name publicly on their certifications
    pub display_name: bool,
    /// Email certificates to the user automatically
    pub email_certs: bool,
    /// Permission to contact with offers (registration only)
    pub can_contact: Option<bool>,
}

// =============================================================================
// SHARED ELEMENT HELPERS
// =============================================================================

fn element(out: &mut String, name: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(value);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn user_agent_element(out: &mut String, suffix: &str) {
    out.push_str("<user_agent>");
    out.push_str(SDK_USER_AGENT);
    if !suffix.is_empty() {
        out.push_str(" / ");
        out.push_str(&xml::escape(suffix));
    }
    out.push_str("</user_agent>");
}

/// Append `<api_key>` or `<password>`. With password authentication,
/// `<request_api_key>Yes</request_api_key>` is added when key issuance is
/// wanted and a domain is present to issue it for.
fn auth_elements(out: &mut String, creds: &Credentials, request_key: bool) -> Result<()> {
    if let Some(key) = creds.current_api_key() {
        element(out, "api_key", key);
        return Ok(());
    }
    let password = creds
        .password()
        .filter(|p| !p.is_empty())
        .ok_or(Error::MissingAuthSecret)?;
    element(out, "password", &xml::escape(password));
    if request_key && creds.effective_domain().is_some() {
        element(out, "request_api_key", "Yes");
    }
    Ok(())
}

fn event_tag_element(out: &mut String, creds: &Credentials) {
    if let Some(tag) = creds.event_tag.as_deref().filter(|t| !t.trim().is_empty()) {
        element(out, "dprv_event", &xml::escape(tag));
    }
}

/// Metadata and document-tracking keys become element names, so they must be
/// XML-name-safe.
fn validate_element_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_first = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_first || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(Error::InvalidElementName(name.to_string()));
    }
    Ok(())
}

fn open_elements(out: &mut String, map: &Metadata) -> Result<()> {
    for (key, value) in map.iter() {
        validate_element_name(key)?;
        element(out, key, &xml::escape(value));
    }
    Ok(())
}

fn file_wrappers(out: &mut String, files: &FileTable, content_type: &str) {
    for (name, fp) in files.iter() {
        out.push_str("<content_wrapper>");
        element(out, "content_type", content_type);
        element(out, "content_filename", &xml::escape(name));
        element(out, "content_fingerprint", &xml::escape(fp));
        out.push_str("</content_wrapper>");
    }
}

// =============================================================================
// CERTIFY
// =============================================================================

/// Build a `digiprove_certify_request` document.
///
/// `raw_content` is the trimmed, unescaped content whose fingerprint is
/// `content_fingerprint`; the fingerprint path is preferred, and the full
/// content is sent only when no fingerprint was computed or the caller asked
/// for retention.
pub fn build_certify(
    creds: &Credentials,
    raw_content: &str,
    content_fingerprint: &str,
    files: &FileTable,
    opts: &CertifyOptions,
) -> Result<String> {
    let mut out = String::from("<digiprove_certify_request>");
    element(&mut out, "user_id", &xml::escape(&creds.user_id));
    if let Some(domain) = creds.effective_domain() {
        element(&mut out, "domain_name", &xml::escape(domain));
    }
    if let Some(alt) = creds
        .alt_domain_name
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        element(&mut out, "alt_domain_name", &xml::escape(alt));
    }
    auth_elements(&mut out, creds, true)?;
    event_tag_element(&mut out, creds);
    user_agent_element(&mut out, &opts.user_agent);

    if let Some(metadata) = &opts.metadata {
        open_elements(&mut out, metadata)?;
    }

    // the primary content is wrapped only when files accompany it
    if !files.is_empty() {
        out.push_str("<content_wrapper>");
    }
    element(&mut out, "content_type", &xml::escape(&opts.content_type));
    if content_fingerprint.is_empty() || opts.save_content {
        element(&mut out, "content_data", &xml::escape_content(raw_content));
    } else {
        element(
            &mut out,
            "content_fingerprint",
            &xml::escape(content_fingerprint),
        );
    }
    if !opts.content_url.is_empty() {
        element(&mut out, "content_url", &xml::escape(&opts.content_url));
        element(
            &mut out,
            "linkback",
            if opts.linkback { "Linkback" } else { "Nolink" },
        );
    }
    if !files.is_empty() {
        out.push_str("</content_wrapper>");
    }
    file_wrappers(&mut out, files, "File");

    if let Some(tracking) = &opts.document_tracking {
        if tracking.get(keys::ORIGINAL_DOCUMENT_ID).is_none() {
            return Err(Error::MissingField(keys::ORIGINAL_DOCUMENT_ID));
        }
        open_elements(&mut out, tracking)?;
    }

    element(&mut out, "obscure_certificate_url", yes_no(opts.obscure_url));
    if opts.return_dp_cert {
        element(&mut out, "return_dp_cert", "Yes");
    }
    element(
        &mut out,
        "email_confirmation",
        yes_no(opts.email_confirmation),
    );
    out.push_str("</digiprove_certify_request>");
    Ok(out)
}

// =============================================================================
// VERIFY
// =============================================================================

/// Build a `digiprove_verify_request` document.
///
/// `creds` may be absent for an anonymous verify. `raw_content` is used as a
/// `<content_data>` fallback only when no fingerprint was computed.
pub fn build_verify(
    creds: Option<&Credentials>,
    certificate_id: &str,
    raw_content: &str,
    content_fingerprint: &str,
    files: &FileTable,
    user_agent: &str,
) -> Result<String> {
    let mut out = String::from("<digiprove_verify_request>");
    if let Some(creds) = creds.filter(|c| !c.user_id.trim().is_empty()) {
        element(&mut out, "user_id", &xml::escape(&creds.user_id));
        if let Some(domain) = creds.effective_domain() {
            element(&mut out, "domain_name", &xml::escape(domain));
        }
        auth_elements(&mut out, creds, false)?;
    }
    user_agent_element(&mut out, user_agent);
    if !certificate_id.is_empty() {
        element(&mut out, "certificate_id", &xml::escape(certificate_id));
    }

    if !files.is_empty() {
        out.push_str("<content_wrapper>");
    }
    if content_fingerprint.is_empty() {
        element(&mut out, "content_data", &xml::escape_content(raw_content));
    } else {
        element(
            &mut out,
            "content_fingerprint",
            &xml::escape(content_fingerprint),
        );
    }
    if !files.is_empty() {
        out.push_str("</content_wrapper>");
    }
    file_wrappers(&mut out, files, "File");
    out.push_str("</digiprove_verify_request>");
    Ok(out)
}

// =============================================================================
// ACCOUNT OPERATIONS
// =============================================================================

/// Build a `digiprove_register_user` document.
///
/// Registration always authenticates with the desired password; the server
/// issues an API key for the supplied domain.
pub fn build_register(
    creds: &Credentials,
    profile: &AccountProfile,
    user_agent: &str,
) -> Result<String> {
    let password = creds
        .password()
        .filter(|p| !p.is_empty())
        .ok_or(Error::MissingAuthSecret)?;

    let mut out = String::from("<digiprove_register_user>");
    user_agent_element(&mut out, user_agent);
    element(&mut out, "user_id", &xml::escape(&creds.user_id));
    element(&mut out, "password", &xml::escape(password));
    element(
        &mut out,
        "email_address",
        &xml::escape(&profile.email_address),
    );
    element(
        &mut out,
        "domain_name",
        &xml::escape(creds.effective_domain().unwrap_or("")),
    );
    element(&mut out, "first_name", &xml::escape(&profile.first_name));
    element(&mut out, "last_name", &xml::escape(&profile.last_name));
    element(&mut out, "display_name", yes_no(profile.display_name));
    element(&mut out, "email_certs", yes_no(profile.email_certs));
    if let Some(can_contact) = profile.can_contact {
        element(&mut out, "can_contact", yes_no(can_contact));
    }
    // new accounts start on the Basic plan; upgrades happen on the website
    element(&mut out, "subscription_plan", "Basic");
    event_tag_element(&mut out, creds);
    out.push_str("</digiprove_register_user>");
    Ok(out)
}

/// Build a `digiprove_update_user` document.
///
/// `renew_api_key` forces the password path and asks the server to replace
/// any previous key for the domain.
pub fn build_update(
    creds: &Credentials,
    profile: &AccountProfile,
    renew_api_key: bool,
    user_agent: &str,
) -> Result<String> {
    let mut out = String::from("<digiprove_update_user>");
    user_agent_element(&mut out, user_agent);
    element(&mut out, "user_id", &xml::escape(&creds.user_id));
    element(
        &mut out,
        "domain_name",
        &xml::escape(creds.effective_domain().unwrap_or("")),
    );

    match creds.current_api_key().filter(|_| !renew_api_key) {
        Some(key) => element(&mut out, "api_key", key),
        None => {
            let password = creds
                .password()
                .filter(|p| !p.is_empty())
                .ok_or(Error::MissingAuthSecret)?;
            element(&mut out, "password", &xml::escape(password));
            element(&mut out, "request_api_key", "Yes");
        }
    }

    element(
        &mut out,
        "email_address",
        &xml::escape(&profile.email_address),
    );
    element(&mut out, "first_name", &xml::escape(&profile.first_name));
    element(&mut out, "last_name", &xml::escape(&profile.last_name));
    element(&mut out, "display_name", yes_no(profile.display_name));
    element(&mut out, "email_certs", yes_no(profile.email_certs));
    event_tag_element(&mut out, creds);
    out.push_str("</digiprove_update_user>");
    Ok(out)
}

/// Build a `digiprove_sync_user` document (subscription refresh).
pub fn build_sync(creds: &Credentials, renew_api_key: bool, user_agent: &str) -> Result<String> {
    let mut out = String::from("<digiprove_sync_user>");
    user_agent_element(&mut out, user_agent);
    element(&mut out, "user_id", &xml::escape(&creds.user_id));
    element(
        &mut out,
        "domain_name",
        &xml::escape(creds.effective_domain().unwrap_or("")),
    );
    if let Some(alt) = creds
        .alt_domain_name
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        element(&mut out, "alt_domain_name", &xml::escape(alt));
    }
    auth_elements(&mut out, creds, false)?;
    if renew_api_key {
        element(&mut out, "request_api_key", "Yes");
    }
    event_tag_element(&mut out, creds);
    out.push_str("</digiprove_sync_user>");
    Ok(out)
}
