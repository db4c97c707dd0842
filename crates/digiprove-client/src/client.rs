//! The five-operation client
//!
//! Certify and the account operations report failures through
//! [`ClientError`]; verification instead folds every failure into the
//! [`VerifyOutcome`] result-code taxonomy, so callers get one code space
//! covering "not authentic", "could not reach the server", and "bad input"
//! alike.

use thiserror::Error;
use tracing::{debug, info, warn};

use digiprove_core::files::{self, FileTable};
use digiprove_core::request::{self, AccountProfile, CertifyOptions};
use digiprove_core::types::{Content, Credentials, verify_code};
use digiprove_core::{fingerprint, xml};
use std::path::Path;

use crate::config::ClientConfig;
use crate::response::{AccountInfo, CertifyReceipt, VerifyOutcome};
use crate::transport::{HttpTransport, Transport, TransportError, ERROR_PREFIX};

/// Failure of a certify or account operation
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be assembled from the supplied inputs
    #[error(transparent)]
    Protocol(#[from] digiprove_core::Error),

    /// The server could not be reached or returned no service response
    #[error("error while attempting to contact server: {0}")]
    Transport(String),

    /// The server responded but the response carried no recognizable result
    #[error("could not decipher server response: {0}")]
    Undecodable(String),

    /// The service processed the request and refused it
    #[error("service rejected request (code {code}): {message}")]
    Rejected { code: String, message: String },
}

/// A completed certification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certification {
    /// Decoded service receipt
    pub receipt: CertifyReceipt,
    /// Archival text to re-supply verbatim on verification. This is the
    /// pre-decode form: fingerprinting it reproduces the certified
    /// fingerprint, which would not hold for the decoded text (entity
    /// decoding is not idempotent).
    pub notarized_content: String,
}

/// Client for the certification service, generic over its transport
pub struct OperationClient<T: Transport> {
    config: ClientConfig,
    transport: T,
}

impl OperationClient<HttpTransport> {
    /// Production-endpoint client over the default HTTPS transport
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.timeout)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> OperationClient<T> {
    /// Client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Endpoint configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn post(&self, host: &str, operation: &str, body: &str) -> Result<String, ClientError> {
        debug!(operation, bytes = body.len(), "posting request");
        let response = self
            .transport
            .post(host, &self.config.path, operation, body)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        // some proxies report delivery failure in a 200 body
        if response.starts_with(ERROR_PREFIX) {
            return Err(ClientError::Transport(response));
        }
        Ok(response)
    }

    /// Map a response that failed the success-marker check to an error:
    /// a readable `<result>` tag means the service refused the request;
    /// anything else is an undecodable body.
    fn classify_failure(&self, operation: &str, body: &str) -> ClientError {
        match xml::extract_tag(body, "result") {
            Some(message) => {
                let code = xml::extract_tag(body, "result_code")
                    .unwrap_or("")
                    .trim()
                    .to_string();
                warn!(operation, code, message, "service rejected request");
                ClientError::Rejected {
                    code,
                    message: message.trim().to_string(),
                }
            }
            None => {
                warn!(operation, "unrecognizable response body");
                ClientError::Undecodable(body.to_string())
            }
        }
    }

    /// Decode the named response wrapper out of a raw HTTP body.
    ///
    /// The wrapper is located after the XML declaration by substring search;
    /// padding, SOAP envelopes, and stray bytes around it are ignored.
    fn decode_wrapped(body: &str, wrapper: &str) -> Option<xml::Node> {
        let declaration = body.find("<?xml ")?;
        let open = format!("<{wrapper}>");
        let close = format!("</{wrapper}>");
        let start = body[declaration..].find(&open)? + declaration + open.len();
        let end = body[start..].find(&close)? + start;
        Some(xml::decode(&body[start..end]))
    }

    // =========================================================================
    // CERTIFY
    // =========================================================================

    /// Certify content, optionally with accompanying files.
    ///
    /// On success the caller's credentials are refreshed in place with any
    /// renewed session state, and the returned [`Certification`] carries the
    /// exact notarized text to archive for later verification.
    pub fn certify<P: AsRef<Path>>(
        &self,
        creds: &mut Credentials,
        content: &Content,
        content_files: &[P],
        opts: &CertifyOptions,
    ) -> Result<Certification, ClientError> {
        creds.validate()?;
        let archival = content.to_archival_text()?;
        let (raw, fp) = fingerprint::fingerprint(&archival);
        let file_table = files::collect(content_files)?;
        if raw.is_empty() && file_table.is_empty() {
            return Err(digiprove_core::Error::EmptyContent.into());
        }

        let mut opts = opts.clone();
        if opts.user_agent.is_empty() {
            opts.user_agent = self.config.user_agent.clone();
        }
        let body = request::build_certify(creds, &raw, &fp, &file_table, &opts)?;
        let response = self.post(&self.config.host, "DigiproveContent", &body)?;

        // success marker check before any decoding
        if xml::find_ci(&response, "<result_code>0").is_none() {
            return Err(self.classify_failure("DigiproveContent", &response));
        }
        let node = Self::decode_wrapped(&response, "digiprove_certify_response")
            .ok_or_else(|| ClientError::Undecodable(response.clone()))?;

        let mut receipt = CertifyReceipt::from_node(&node);
        if receipt.digital_fingerprint.is_none() && !fp.is_empty() {
            receipt.digital_fingerprint = Some(fp);
        }
        receipt.content_files = file_table;
        creds.refresh_session(
            receipt.api_key.as_deref(),
            receipt.subscription_type.as_deref(),
            receipt.subscription_expiry.as_deref(),
        );
        info!(
            certificate_id = receipt.certificate_id.as_deref().unwrap_or(""),
            "content certified"
        );
        Ok(Certification {
            receipt,
            notarized_content: archival.trim().to_string(),
        })
    }

    // =========================================================================
    // VERIFY
    // =========================================================================

    /// Verify content against the service.
    ///
    /// `creds` may be `None` for an anonymous check; credentials without a
    /// user id are treated the same way. All failures come back through the
    /// outcome's result code; only unreadable content files are an `Err`.
    pub fn verify<P: AsRef<Path>>(
        &self,
        creds: Option<&Credentials>,
        certificate_id: &str,
        content: &Content,
        content_files: &[P],
    ) -> Result<VerifyOutcome, ClientError> {
        let archival = content.to_archival_text()?;
        let (raw, fp) = fingerprint::fingerprint(&archival);
        if raw.is_empty() {
            return Ok(VerifyOutcome::failure(
                verify_code::EMPTY_CONTENT,
                "Raw content is empty",
            ));
        }
        self.verify_fingerprint(creds, certificate_id, &raw, &fp, content_files)
    }

    /// As [`verify`](Self::verify), but with a caller-computed fingerprint.
    pub fn verify_fingerprint<P: AsRef<Path>>(
        &self,
        creds: Option<&Credentials>,
        certificate_id: &str,
        raw_content: &str,
        content_fingerprint: &str,
        content_files: &[P],
    ) -> Result<VerifyOutcome, ClientError> {
        // credentials without a user id are treated as an anonymous request
        if let Some(creds) = creds.filter(|c| !c.user_id.trim().is_empty()) {
            if creds.validate().is_err() {
                return Ok(VerifyOutcome::failure(
                    verify_code::CREDENTIALS_INCOMPLETE,
                    "Credentials incomplete",
                ));
            }
        }
        let file_table = files::collect(content_files)?;
        let body = match request::build_verify(
            creds,
            certificate_id,
            raw_content,
            content_fingerprint,
            &file_table,
            &self.config.user_agent,
        ) {
            Ok(body) => body,
            Err(e) => {
                return Ok(VerifyOutcome::failure(
                    verify_code::INTERNAL,
                    format!("Failed to create request: {e}"),
                ));
            }
        };

        let response = match self.post(&self.config.verify_host, "DigiproveVerify", &body) {
            Ok(response) => response,
            Err(e) => {
                warn!("verification transport failure: {e}");
                return Ok(VerifyOutcome::failure(verify_code::TRANSPORT, e.to_string()));
            }
        };

        // codes in the 200-299 range mean the verification process completed
        if xml::find_ci(&response, "<result_code>2").is_none() {
            return Ok(match xml::extract_tag(&response, "result") {
                Some(message) => VerifyOutcome {
                    result_code: xml::extract_tag(&response, "result_code")
                        .unwrap_or("")
                        .trim()
                        .to_string(),
                    result: message.trim().to_string(),
                    ..VerifyOutcome::default()
                },
                None => VerifyOutcome::failure(
                    verify_code::UNDECODABLE,
                    "Could not decipher server response",
                ),
            });
        }

        let Some(node) = Self::decode_wrapped(&response, "digiprove_verify_response") else {
            return Ok(VerifyOutcome::failure(
                verify_code::UNDECODABLE,
                "Could not decipher server response",
            ));
        };
        let mut outcome = VerifyOutcome::from_node(&node);
        if outcome.content_fingerprint.is_none() && !content_fingerprint.is_empty() {
            outcome.content_fingerprint = Some(content_fingerprint.to_string());
        }
        debug!(
            code = outcome.result_code,
            documents = outcome.documents.len(),
            "verification completed"
        );
        Ok(outcome)
    }

    // =========================================================================
    // ACCOUNT OPERATIONS
    // =========================================================================

    /// Register a new account. On success the issued API key is stored in
    /// the caller's session.
    pub fn register_user(
        &self,
        creds: &mut Credentials,
        profile: &AccountProfile,
    ) -> Result<AccountInfo, ClientError> {
        creds.validate_account()?;
        if profile.email_address.trim().is_empty() {
            return Err(digiprove_core::Error::MissingField("email_address").into());
        }
        if profile.first_name.trim().is_empty() && profile.last_name.trim().is_empty() {
            return Err(digiprove_core::Error::MissingField("first_name").into());
        }
        if creds.effective_domain().is_none() {
            return Err(digiprove_core::Error::MissingDomain.into());
        }

        let body = request::build_register(creds, profile, &self.config.user_agent)?;
        let info = self.account_round_trip(
            "RegisterUser",
            "digiprove_register_user_response",
            &body,
        )?;
        creds.merge_session(info.api_key.as_deref(), None, None);
        info!(user_id = creds.user_id, "account registered");
        Ok(info)
    }

    /// Update account profile details, optionally renewing the API key.
    pub fn update_user(
        &self,
        creds: &mut Credentials,
        profile: &AccountProfile,
        renew_api_key: bool,
    ) -> Result<AccountInfo, ClientError> {
        creds.validate_account()?;
        let body = request::build_update(creds, profile, renew_api_key, &self.config.user_agent)?;
        // the service answers update with the register wrapper
        let info =
            self.account_round_trip("UpdateUser", "digiprove_register_user_response", &body)?;
        creds.merge_session(
            info.api_key.as_deref(),
            info.subscription_type.as_deref(),
            info.subscription_expiry.as_deref(),
        );
        Ok(info)
    }

    /// Fetch current account state (subscription, optionally a fresh key)
    /// and refresh the caller's session with it.
    pub fn get_user(
        &self,
        creds: &mut Credentials,
        renew_api_key: bool,
    ) -> Result<AccountInfo, ClientError> {
        creds.validate_account()?;
        let body = request::build_sync(creds, renew_api_key, &self.config.user_agent)?;
        let info = self.account_round_trip("SyncUser", "sync_user_response", &body)?;
        creds.merge_session(
            info.api_key.as_deref(),
            info.subscription_type.as_deref(),
            info.subscription_expiry.as_deref(),
        );
        Ok(info)
    }

    fn account_round_trip(
        &self,
        operation: &str,
        wrapper: &str,
        body: &str,
    ) -> Result<AccountInfo, ClientError> {
        let response = self.post(&self.config.host, operation, body)?;
        if xml::find_ci(&response, "<result_code>0").is_none() {
            return Err(self.classify_failure(operation, &response));
        }
        let node = Self::decode_wrapped(&response, wrapper)
            .ok_or_else(|| ClientError::Undecodable(response.clone()))?;
        Ok(AccountInfo::from_node(&node))
    }
}
