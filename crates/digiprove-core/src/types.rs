//! Credential, content, and result-code types for the Digiprove protocol
//!
//! Field and constant names mirror the wire protocol element names so host
//! applications can persist and inspect values without translation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Minimum password length accepted by account operations
pub const MIN_PASSWORD_LEN: usize = 6;

/// Result code reported by the service when an operation succeeded
pub const RESULT_SUCCESS: &str = "0";

// =============================================================================
// VERIFY RESULT CODES
// =============================================================================

/// Verify result codes (service-defined strings)
///
/// Codes in the 200-299 range mean the verification process completed,
/// which is not the same as the content being authentic: 220 is a policy
/// failure delivered through a completed verification.
pub mod verify_code {
    /// Document is authentic and all requested checks were successful
    pub const AUTHENTIC: &str = "200";
    /// Qualified success (qualification described in result)
    pub const QUALIFIED: &str = "201";
    /// Document is authentic but out of date
    pub const OUTDATED: &str = "202";
    /// The service has no record of this document
    pub const UNKNOWN_DOCUMENT: &str = "210";
    /// Document family known, this instance unknown
    pub const UNKNOWN_INSTANCE: &str = "211";
    /// Certificate id valid but the fingerprint does not match
    pub const TAMPER_ALERT: &str = "220";
    /// Credentials incomplete
    pub const CREDENTIALS_INCOMPLETE: &str = "101";
    /// Raw content (after trimming) is empty
    pub const EMPTY_CONTENT: &str = "102";
    /// Internal error
    pub const INTERNAL: &str = "110";
    /// Error while attempting to contact the server
    pub const TRANSPORT: &str = "111";
    /// Could not decipher the server response
    pub const UNDECODABLE: &str = "112";
    /// XML validation error (described in the result tag)
    pub const XML_INVALID: &str = "120";
    /// Other error (described in the result tag)
    pub const OTHER: &str = "130";
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Authentication secret: an account password or a per-domain API key
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthMethod {
    /// Account password (escaped before transmission)
    Password(String),
    /// Server-issued API key, always tied to the domain it was issued for
    ApiKey { key: String, domain: String },
}

/// Session-derived account state refreshed by successful operations
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    /// API key issued or renewed by the server
    pub api_key: Option<String>,
    /// Up-to-date subscription type
    pub subscription_type: Option<String>,
    /// Up-to-date subscription expiry date
    pub subscription_expiry: Option<String>,
}

/// Caller-owned credentials threaded through every operation
///
/// Operations take `&mut Credentials` and overwrite [`SessionInfo`] in place
/// after a successful response, so the caller's next call reuses the
/// refreshed session. Callers relying on a local credential cache should
/// persist the value after each successful operation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account user id (immutable identity)
    pub user_id: String,
    /// Authentication secret
    pub auth: AuthMethod,
    /// Primary domain name
    pub domain_name: Option<String>,
    /// Alternate domain name
    pub alt_domain_name: Option<String>,
    /// Opaque tracking tag, sent as `<dprv_event>`
    pub event_tag: Option<String>,
    /// Session state updated by successful responses
    pub session: SessionInfo,
}

impl Credentials {
    /// Password-authenticated credentials
    pub fn with_password(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            auth: AuthMethod::Password(password.into()),
            domain_name: None,
            alt_domain_name: None,
            event_tag: None,
            session: SessionInfo::default(),
        }
    }

    /// API-key-authenticated credentials (recommended)
    pub fn with_api_key(
        user_id: impl Into<String>,
        key: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            auth: AuthMethod::ApiKey {
                key: key.into(),
                domain: domain.into(),
            },
            domain_name: None,
            alt_domain_name: None,
            event_tag: None,
            session: SessionInfo::default(),
        }
    }

    /// The configured password, if password authentication is in use
    pub fn password(&self) -> Option<&str> {
        match &self.auth {
            AuthMethod::Password(p) => Some(p),
            AuthMethod::ApiKey { .. } => None,
        }
    }

    /// Freshest non-empty API key: a session-renewed key wins over the
    /// configured one.
    pub fn current_api_key(&self) -> Option<&str> {
        let session_key = self.session.api_key.as_deref().filter(|k| !k.is_empty());
        session_key.or(match &self.auth {
            AuthMethod::ApiKey { key, .. } if !key.is_empty() => Some(key),
            _ => None,
        })
    }

    /// Domain used for key issuance: explicit `domain_name` wins, then the
    /// API key's domain, then `alt_domain_name`.
    pub fn effective_domain(&self) -> Option<&str> {
        let explicit = self.domain_name.as_deref().filter(|d| !d.trim().is_empty());
        let key_domain = match &self.auth {
            AuthMethod::ApiKey { domain, .. } if !domain.trim().is_empty() => Some(domain.as_str()),
            _ => None,
        };
        let alt = self
            .alt_domain_name
            .as_deref()
            .filter(|d| !d.trim().is_empty());
        explicit.or(key_domain).or(alt)
    }

    /// Validate the credentials for certify/verify use.
    ///
    /// `user_id` is mandatory. When no password is held, a non-empty API key
    /// and its domain are both required; the error names the missing field.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::MissingUserId);
        }
        if self.password().is_some_and(|p| !p.is_empty()) {
            return Ok(());
        }
        if self.current_api_key().is_none() {
            return Err(Error::MissingAuthSecret);
        }
        if self.effective_domain().is_none() {
            return Err(Error::MissingDomain);
        }
        Ok(())
    }

    /// Stricter validation used by account operations (register / update /
    /// get_user): when no API key is held the password must be at least
    /// [`MIN_PASSWORD_LEN`] characters.
    pub fn validate_account(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::MissingUserId);
        }
        if self.current_api_key().is_some() {
            return Ok(());
        }
        match self.password() {
            None => Err(Error::MissingAuthSecret),
            Some(p) if p.trim().is_empty() => Err(Error::MissingAuthSecret),
            Some(p) if p.chars().count() < MIN_PASSWORD_LEN => Err(Error::PasswordTooShort),
            Some(_) => Ok(()),
        }
    }

    /// Copy renewed session fields from a successful certify response into
    /// the credentials so the next call reuses the refreshed session.
    ///
    /// An empty subscription expiry alongside a subscription type clears the
    /// stored expiry (open-ended subscription). Certify responses always
    /// report the full subscription state, so an absent expiry is
    /// authoritative here; account responses are merged with
    /// [`merge_session`](Self::merge_session) instead.
    pub fn refresh_session(
        &mut self,
        api_key: Option<&str>,
        subscription_type: Option<&str>,
        subscription_expiry: Option<&str>,
    ) {
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            self.session.api_key = Some(key.to_string());
        }
        if let Some(sub) = subscription_type.map(str::trim).filter(|s| !s.is_empty()) {
            self.session.subscription_type = Some(sub.to_string());
            self.session.subscription_expiry = subscription_expiry
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }
    }

    /// As [`refresh_session`](Self::refresh_session), but never clears
    /// stored state: only fields present in the response are overwritten.
    /// Account responses omit the expiry when it is unchanged, so an absent
    /// expiry is not authoritative for them.
    pub fn merge_session(
        &mut self,
        api_key: Option<&str>,
        subscription_type: Option<&str>,
        subscription_expiry: Option<&str>,
    ) {
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            self.session.api_key = Some(key.to_string());
        }
        if let Some(sub) = subscription_type.map(str::trim).filter(|s| !s.is_empty()) {
            self.session.subscription_type = Some(sub.to_string());
        }
        if let Some(exp) = subscription_expiry.map(str::trim).filter(|s| !s.is_empty()) {
            self.session.subscription_expiry = Some(exp.to_string());
        }
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// Content to be certified or verified
///
/// Structured values are serialized to a deterministic JSON string before
/// fingerprinting; that string is returned to the caller for archival and
/// must be re-supplied verbatim on verification.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    /// Raw text, already decoded from any transport-level escaping
    Text(String),
    /// Structured value, serialized to JSON for fingerprinting
    Structured(serde_json::Value),
}

impl Content {
    /// The textual form that is fingerprinted and archived
    pub fn to_archival_text(&self) -> Result<String> {
        match self {
            Content::Text(s) => Ok(s.clone()),
            Content::Structured(v) => Ok(serde_json::to_string(v)?),
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<serde_json::Value> for Content {
    fn from(v: serde_json::Value) -> Self {
        Content::Structured(v)
    }
}

// =============================================================================
// METADATA / DOCUMENT TRACKING
// =============================================================================

/// Conventional element-map keys fixed by the protocol
pub mod keys {
    /// Metadata: title of the content
    pub const CONTENT_TITLE: &str = "content_title";
    /// Metadata: description of the content
    pub const ABSTRACT: &str = "abstract";
    /// Metadata: author or authors
    pub const AUTHORS: &str = "authors";
    /// Document tracking: id of the original document (mandatory)
    pub const ORIGINAL_DOCUMENT_ID: &str = "original_document_id";
    /// Document tracking: document title
    pub const DOCUMENT_TITLE: &str = "document_title";
    /// Document tracking: version number/code of this instance
    pub const VERSION: &str = "version";
}

/// Ordered string-to-string mapping rendered as sibling XML elements named
/// after its keys. Inserting an existing key replaces its value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElementMap {
    pairs: Vec<(String, String)>,
}

impl ElementMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing any existing value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }

    /// Value for a key, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when the map holds no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Open metadata map (conventional keys in [`keys`])
pub type Metadata = ElementMap;

/// Document tracking map (`original_document_id` is mandatory)
pub type DocumentTracking = ElementMap;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_mandatory() {
        let creds = Credentials::with_password("", "secret123");
        assert!(matches!(creds.validate(), Err(Error::MissingUserId)));
    }

    #[test]
    fn test_password_alone_passes() {
        let creds = Credentials::with_password("u", "123456");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_empty_password_needs_api_key() {
        let creds = Credentials::with_password("u", "");
        assert!(matches!(creds.validate(), Err(Error::MissingAuthSecret)));
    }

    #[test]
    fn test_api_key_without_domain_fails() {
        let creds = Credentials::with_api_key("u", "k", "");
        assert!(matches!(creds.validate(), Err(Error::MissingDomain)));
    }

    #[test]
    fn test_api_key_with_domain_passes() {
        let creds = Credentials::with_api_key("u", "k", "example.com");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_account_validation_requires_password_length() {
        let creds = Credentials::with_password("u", "12345");
        assert!(matches!(
            creds.validate_account(),
            Err(Error::PasswordTooShort)
        ));
        let creds = Credentials::with_password("u", "123456");
        assert!(creds.validate_account().is_ok());
    }

    #[test]
    fn test_account_validation_skips_length_with_api_key() {
        let creds = Credentials::with_api_key("u", "k", "example.com");
        assert!(creds.validate_account().is_ok());
    }

    #[test]
    fn test_session_key_wins_over_configured() {
        let mut creds = Credentials::with_api_key("u", "old", "example.com");
        creds.refresh_session(Some(" new "), Some("Pro"), Some("2026-12-31"));
        assert_eq!(creds.current_api_key(), Some("new"));
        assert_eq!(creds.session.subscription_type.as_deref(), Some("Pro"));
        assert_eq!(
            creds.session.subscription_expiry.as_deref(),
            Some("2026-12-31")
        );
    }

    #[test]
    fn test_refresh_clears_expiry_when_absent() {
        let mut creds = Credentials::with_password("u", "123456");
        creds.session.subscription_expiry = Some("2025-01-01".into());
        creds.refresh_session(None, Some("Basic"), None);
        assert_eq!(creds.session.subscription_expiry, None);
    }

    #[test]
    fn test_merge_keeps_expiry_when_absent() {
        let mut creds = Credentials::with_password("u", "123456");
        creds.session.subscription_expiry = Some("2025-01-01".into());
        creds.merge_session(Some("fresh"), Some("Basic"), None);
        assert_eq!(creds.current_api_key(), Some("fresh"));
        assert_eq!(creds.session.subscription_type.as_deref(), Some("Basic"));
        assert_eq!(
            creds.session.subscription_expiry.as_deref(),
            Some("2025-01-01")
        );
    }

    #[test]
    fn test_element_map_insert_replaces() {
        let mut map = ElementMap::new();
        map.insert(keys::CONTENT_TITLE, "first");
        map.insert(keys::AUTHORS, "a. uthor");
        map.insert(keys::CONTENT_TITLE, "second");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(keys::CONTENT_TITLE), Some("second"));
        let order: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![keys::CONTENT_TITLE, keys::AUTHORS]);
    }

    #[test]
    fn test_structured_content_is_deterministic() {
        let value = serde_json::json!({"b": 1, "a": [1, 2]});
        let c1 = Content::from(value.clone()).to_archival_text().unwrap();
        let c2 = Content::from(value).to_archival_text().unwrap();
        assert_eq!(c1, c2);
    }
}
