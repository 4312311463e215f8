// Transport configuration for building the panel's reqwest::Client.
//
// TLS, timeouts, user agent and the retry bound all live here so the
// client module only deals with URLs, tokens and status mapping.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Number of attempts per call when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled webpki root store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed panels).
    DangerAcceptInvalid,
}

/// Transport configuration for `MarzbanClient`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
    /// Attempts per call, including the first one. Zero behaves as one.
    pub max_attempts: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            connect_timeout: None,
            user_agent: concat!("marzban-api/", env!("CARGO_PKG_VERSION")).to_owned(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Attempts actually made per call (never less than one).
    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
