use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("ld-portal/", env!("CARGO_PKG_VERSION"));

/// Upper bound on the body text carried by [`crate::HttpError::HttpStatus`].
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Also accept `http://` URLs. Meant for local backends and mock servers.
    AllowInsecureHttp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsRootConfig {
    /// Mozilla roots compiled into the binary.
    #[default]
    WebPki,
    /// Roots from the OS certificate store.
    Native,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Deadline for one request, from connect to the last body byte.
    pub request_timeout: Duration,
    pub user_agent: String,
    pub max_body_size: usize,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: 10 * 1024 * 1024,
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::WebPki,
        }
    }
}
