#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
//! Buffered JSON HTTP client.
//!
//! `send()` resolves for every HTTP status; only transport, TLS, timeout and
//! body-limit failures are errors. Turn non-2xx responses into errors with
//! [`HttpResponse::error_for_status`].

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_USER_AGENT, ERROR_BODY_PREVIEW_LIMIT, HttpClientConfig, TlsRootConfig,
    TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::HttpResponse;
