use crate::config::HttpClientConfig;
use crate::request::RequestBuilder;
use bytes::Bytes;
use http::Method;
use http_body_util::Full;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use std::sync::Arc;

pub type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) inner: HyperClient,
    pub(crate) user_agent: http::HeaderValue,
    pub(crate) config: Arc<HttpClientConfig>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    #[must_use]
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, url.to_owned())
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }
}
