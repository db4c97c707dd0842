//! Service endpoint configuration

use std::time::Duration;

/// Production certify/account endpoint host
pub const DEFAULT_HOST: &str = "api.digiprove.com";

/// Production verify endpoint host
pub const DEFAULT_VERIFY_HOST: &str = "verify.digiprove.com";

/// Service path; the operation name is appended to it
pub const DEFAULT_PATH: &str = "/secure/service.asmx/";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Endpoint configuration for an [`OperationClient`](crate::OperationClient)
///
/// Verification runs against a separate host from the certify and account
/// operations. Both default to the production service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host for certify and account operations
    pub host: String,
    /// Host for verify operations
    pub verify_host: String,
    /// Service path, ending in `/`
    pub path: String,
    /// Caller software identity appended to the SDK identity on the wire
    pub user_agent: String,
    /// Request timeout for the default transport
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            verify_host: DEFAULT_VERIFY_HOST.to_string(),
            path: DEFAULT_PATH.to_string(),
            user_agent: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Default endpoints with a caller user-agent suffix
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_production() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "api.digiprove.com");
        assert_eq!(config.verify_host, "verify.digiprove.com");
        assert_eq!(config.path, "/secure/service.asmx/");
    }
}
