//! Layered portal configuration.
//!
//! Sources are merged in this order, later ones winning:
//! 1) built-in defaults, 2) an optional YAML file, 3) `LDP__*` environment
//!    variables (`__` separates nesting, e.g. `LDP__API__BASE_URL`),
//! 4) command line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use ldp_http::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable prefix of the configuration layer.
pub const ENV_PREFIX: &str = "LDP__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("invalid api.base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] ldp_http::HttpError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Backend root, every endpoint path is appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "crate::humantime_serde")]
    pub timeout: Duration,

    /// Permit `http://` backends. Needed for the local development server.
    #[serde(default = "default_allow_insecure_http")]
    pub allow_insecure_http: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest accepted response body in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Directory holding `session.json`.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    #[serde(default = "default_poll_interval", with = "crate::humantime_serde")]
    pub poll_interval: Duration,

    /// Number of notifications fetched per poll.
    #[serde(default = "default_notification_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `warn` or `ld_portal=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_owned()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_allow_insecure_http() -> bool {
    true
}

fn default_user_agent() -> String {
    ldp_http::DEFAULT_USER_AGENT.to_owned()
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(|| PathBuf::from(".ld-portal"), |d| d.join("ld-portal"))
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_notification_limit() -> u32 {
    20
}

fn default_log_level() -> String {
    "warn".to_owned()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            allow_insecure_http: default_allow_insecure_http(),
            user_agent: default_user_agent(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            limit: default_notification_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    /// `-v` count: 1 info, 2 debug, 3 or more trace.
    pub verbose: u8,
}

impl PortalConfig {
    /// Figment holding defaults, the optional YAML file and the environment.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingFile` when `path` is given but is not a file.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(PortalConfig::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load the layered configuration, defaults only when no file is given.
    ///
    /// # Errors
    /// Returns `ConfigError` when the file is missing, a layer fails to
    /// parse, or the resulting base URL is unusable.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: PortalConfig = Self::figment(path)?.extract().map_err(Box::new)?;
        config.api.parsed_base_url()?;
        Ok(config)
    }

    /// Apply the command line layer.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidBaseUrl` for an unusable `--base-url`.
    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(url) = &overrides.base_url {
            url.clone_into(&mut self.api.base_url);
            self.api.parsed_base_url()?;
        }
        if let Some(level) = verbosity_level(overrides.verbose) {
            level.clone_into(&mut self.logging.level);
        }
        Ok(())
    }
}

fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash, checked for an http(s) scheme.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidBaseUrl` when the URL does not parse or
    /// uses another scheme.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let url =
            Url::parse(self.base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }

    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            max_body_size: self.max_body_size,
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            tls_roots: TlsRootConfig::default(),
        }
    }
}
