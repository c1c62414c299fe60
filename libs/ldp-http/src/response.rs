use crate::config::ERROR_BODY_PREVIEW_LIMIT;
use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// # Errors
    ///
    /// `HttpError::Json` when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Converts a non-2xx response into `HttpError::HttpStatus`.
    ///
    /// # Errors
    ///
    /// `HttpError::HttpStatus` with a bounded preview of the body.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(HttpError::HttpStatus {
            status: self.status,
            body_preview: preview(&self.body),
        })
    }
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= ERROR_BODY_PREVIEW_LIMIT {
        return text.into_owned();
    }
    let mut end = ERROR_BODY_PREVIEW_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &'static str) -> HttpResponse {
        HttpResponse::new(status, HeaderMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_error_for_status_passes_success() {
        let resp = response(StatusCode::OK, "{}").error_for_status().unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_for_status_carries_body() {
        let err = response(StatusCode::NOT_FOUND, "missing")
            .error_for_status()
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body_preview, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_preview_is_bounded_on_char_boundary() {
        let body = "\u{e9}".repeat(ERROR_BODY_PREVIEW_LIMIT);
        let out = preview(body.as_bytes());
        assert!(out.len() <= ERROR_BODY_PREVIEW_LIMIT + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_json_decodes_body() {
        let value: serde_json::Value = response(StatusCode::OK, r#"{"a":1}"#).json().unwrap();
        assert_eq!(value["a"], 1);
    }
}
