//! REST implementation of [`PortalClientV1`].
//!
//! Every backend response is wrapped in `{ "success": bool, "data" | "message" }`.
//! Some endpoints (login, registration, intern creation) put their payload
//! next to `success` instead of under `data`.

use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use ld_portal_sdk::{
    Credentials, CustomerRequest, CustomerUpdate, DemoAccount, DemoCredentials, DemoUpdate,
    Intern, InternUpdate, LoginRequest, LoginResponse, NewIntern, Notification, NotificationQuery,
    PortalClientV1, PortalError, ProjectUpdate, RecipientType, Registration, RegistrationReceipt,
    RequestStatus,
};
use ldp_http::{HttpClient, HttpClientBuilder, HttpError, HttpResponse, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::{ApiConfig, ConfigError};
use crate::domain::session::SessionContext;

const UNAUTHORIZED_MESSAGE: &str = "session expired, please log in again";

/// Portal backend client over [`HttpClient`].
///
/// Sends the session token as a bearer credential when one is present and
/// clears the session on any `401 Unauthorized`.
#[derive(Clone)]
pub struct RestPortalClient {
    http: HttpClient,
    base_url: String,
    session: Arc<SessionContext>,
}

impl std::fmt::Debug for RestPortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPortalClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct NotificationParams<'a> {
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_id: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    unread_only: bool,
}

#[derive(Serialize)]
struct RecipientParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_id: Option<&'a str>,
}

impl RestPortalClient {
    /// `base_url` is the API root, e.g. `https://portal.example.com/api`.
    #[must_use]
    pub fn new(http: HttpClient, base_url: &str, session: Arc<SessionContext>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            session,
        }
    }

    /// Build the HTTP client and the REST client from configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` for an unusable base URL or HTTP client settings.
    pub fn from_config(
        config: &ApiConfig,
        session: Arc<SessionContext>,
    ) -> Result<Self, ConfigError> {
        let base_url = config.parsed_base_url()?;
        let http = HttpClientBuilder::with_config(config.http_client_config()).build()?;
        Ok(Self::new(http, base_url.as_str(), session))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, &format!("{}{path}", self.base_url));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    fn with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<RequestBuilder, PortalError> {
        self.request(method, path)
            .json(body)
            .map_err(|e| PortalError::validation(e.to_string()))
    }

    /// Send and unwrap the envelope, returning the whole response object.
    async fn call(&self, builder: RequestBuilder) -> Result<Value, PortalError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let message = envelope_message(&response)
                .unwrap_or_else(|| UNAUTHORIZED_MESSAGE.to_owned());
            tracing::warn!(%status, "backend rejected the session, signing out");
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "failed to clear the stored session");
            }
            return Err(PortalError::unauthorized(message));
        }

        let body: Value = if response.bytes().is_empty() {
            Value::Null
        } else {
            match response.json() {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(PortalError::decode(e.to_string())),
                Err(_) => return Err(status_error(status, None)),
            }
        };

        let refused = body.get("success").and_then(Value::as_bool) == Some(false);
        if refused || !status.is_success() {
            let message = message_of(&body);
            tracing::debug!(%status, message = message.as_deref().unwrap_or(""), "request refused");
            return Err(status_error(status, message));
        }
        Ok(body)
    }

    /// Payload under `data`.
    async fn call_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, PortalError> {
        let mut body = self.call(builder).await?;
        decode(body.get_mut("data").map_or(Value::Null, Value::take))
    }

    /// Payload next to `success`.
    async fn call_top<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, PortalError> {
        decode(self.call(builder).await?)
    }

    async fn call_unit(&self, builder: RequestBuilder) -> Result<(), PortalError> {
        self.call(builder).await.map(drop)
    }

    async fn notes(&self, path: &str, body: &Value) -> Result<(), PortalError> {
        self.call_unit(self.with_body(Method::PUT, path, body)?)
            .await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, PortalError> {
    serde_json::from_value(value).map_err(|e| PortalError::decode(e.to_string()))
}

fn transport_error(e: HttpError) -> PortalError {
    tracing::warn!(error = %e, "request failed before a response");
    PortalError::transport(e.to_string())
}

fn message_of(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

fn envelope_message(response: &HttpResponse) -> Option<String> {
    response.json::<Value>().ok().as_ref().and_then(message_of)
}

fn status_error(status: StatusCode, message: Option<String>) -> PortalError {
    let message = message.unwrap_or_else(|| format!("request failed with HTTP {}", status.as_u16()));
    if status == StatusCode::NOT_FOUND {
        PortalError::not_found(message)
    } else {
        PortalError::application(message)
    }
}

/// Integer id from a JSON number or numeric string.
fn id_of(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn created_id(body: &Value, top_level_key: &str) -> Option<i64> {
    id_of(body.get(top_level_key)).or_else(|| id_of(body.get("data").and_then(|d| d.get("id"))))
}

#[async_trait]
impl PortalClientV1 for RestPortalClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, PortalError> {
        let response: LoginResponse = self
            .call_top(self.with_body(Method::POST, "/auth/login", request)?)
            .await?;
        if let Err(e) = self
            .session
            .set(response.token.clone(), response.user.clone())
        {
            tracing::warn!(error = %e, "signed in but the session could not be stored");
        }
        Ok(response)
    }

    async fn logout(&self) -> Result<(), PortalError> {
        let result = self
            .call_unit(self.request(Method::POST, "/auth/logout"))
            .await;
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "failed to clear the stored session");
        }
        match result {
            Err(PortalError::Unauthorized { .. }) | Ok(()) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegistrationReceipt, PortalError> {
        self.call_top(self.with_body(Method::POST, "/auth/register", registration)?)
            .await
    }

    async fn list_interns(&self) -> Result<Vec<Intern>, PortalError> {
        self.call_data(self.request(Method::GET, "/admin/interns"))
            .await
    }

    async fn create_intern(&self, intern: &NewIntern) -> Result<Option<i64>, PortalError> {
        let body = self
            .call(self.with_body(Method::POST, "/admin/interns", intern)?)
            .await?;
        Ok(created_id(&body, "intern_id"))
    }

    async fn update_intern(&self, id: i64, update: &InternUpdate) -> Result<(), PortalError> {
        self.call_unit(self.with_body(Method::PUT, &format!("/admin/interns/{id}"), update)?)
            .await
    }

    async fn update_intern_credentials(
        &self,
        id: i64,
        credentials: &Credentials,
    ) -> Result<(), PortalError> {
        let path = format!("/admin/interns/{id}/credentials");
        self.call_unit(self.with_body(Method::PUT, &path, credentials)?)
            .await
    }

    async fn delete_intern(&self, id: i64) -> Result<(), PortalError> {
        self.call_unit(self.request(Method::DELETE, &format!("/admin/interns/{id}")))
            .await
    }

    async fn list_customer_requests(&self) -> Result<Vec<CustomerRequest>, PortalError> {
        self.call_data(self.request(Method::GET, "/admin/customers"))
            .await
    }

    async fn create_customer(
        &self,
        customer: &CustomerUpdate,
    ) -> Result<Option<i64>, PortalError> {
        let body = self
            .call(self.with_body(Method::POST, "/admin/customers", customer)?)
            .await?;
        Ok(created_id(&body, "request_id"))
    }

    async fn update_customer(&self, id: i64, update: &CustomerUpdate) -> Result<(), PortalError> {
        let path = format!("/admin/customers/{id}");
        self.call_unit(self.with_body(Method::PUT, &path, update)?)
            .await
    }

    async fn delete_customer(&self, id: i64) -> Result<(), PortalError> {
        self.call_unit(self.request(Method::DELETE, &format!("/admin/customers/{id}")))
            .await
    }

    async fn assign_intern(
        &self,
        request_id: i64,
        intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        let path = format!("/admin/requests/{request_id}/assign");
        self.call_unit(self.with_body(Method::POST, &path, &json!({ "intern_id": intern_id }))?)
            .await
    }

    async fn update_request_status(
        &self,
        request_id: i64,
        status: &RequestStatus,
    ) -> Result<(), PortalError> {
        let path = format!("/admin/requests/{request_id}/status");
        self.call_unit(self.with_body(Method::PUT, &path, &json!({ "status": status }))?)
            .await
    }

    async fn update_project(
        &self,
        request_id: i64,
        update: &ProjectUpdate,
    ) -> Result<(), PortalError> {
        let path = format!("/admin/requests/{request_id}/project");
        self.call_unit(self.with_body(Method::PUT, &path, update)?)
            .await
    }

    async fn list_demo_accounts(&self) -> Result<Vec<DemoAccount>, PortalError> {
        self.call_data(self.request(Method::GET, "/admin/demos"))
            .await
    }

    async fn update_demo_account(&self, id: i64, update: &DemoUpdate) -> Result<(), PortalError> {
        let path = format!("/admin/demos/{id}");
        self.call_unit(self.with_body(Method::PUT, &path, update)?)
            .await
    }

    async fn delete_demo_account(&self, id: i64) -> Result<(), PortalError> {
        self.call_unit(self.request(Method::DELETE, &format!("/admin/demos/{id}")))
            .await
    }

    async fn regenerate_demo_credentials(&self, id: i64) -> Result<DemoCredentials, PortalError> {
        let path = format!("/admin/demos/{id}/regenerate-credentials");
        self.call_data(self.request(Method::POST, &path)).await
    }

    async fn assign_intern_to_demo(
        &self,
        demo_id: i64,
        intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        let path = format!("/admin/demos/{demo_id}/assign-intern");
        self.call_unit(self.with_body(Method::POST, &path, &json!({ "intern_id": intern_id }))?)
            .await
    }

    async fn update_demo_admin_note(&self, demo_id: i64, note: &str) -> Result<(), PortalError> {
        self.notes(
            &format!("/admin/demos/{demo_id}/admin-note"),
            &json!({ "admin_note": note }),
        )
        .await
    }

    async fn update_demo_intern_note(&self, demo_id: i64, note: &str) -> Result<(), PortalError> {
        self.notes(
            &format!("/admin/demos/{demo_id}/intern-note"),
            &json!({ "intern_note": note }),
        )
        .await
    }

    async fn intern_requests(&self, intern_id: &str) -> Result<Vec<CustomerRequest>, PortalError> {
        self.call_data(
            self.request(Method::GET, "/intern/requests")
                .query(&[("intern_id", intern_id)]),
        )
        .await
    }

    async fn update_request_intern_note(
        &self,
        request_id: i64,
        note: &str,
    ) -> Result<(), PortalError> {
        self.notes(
            &format!("/intern/requests/{request_id}/note"),
            &json!({ "intern_note": note }),
        )
        .await
    }

    async fn intern_demo_accounts(&self, intern_id: &str) -> Result<Vec<DemoAccount>, PortalError> {
        self.call_data(
            self.request(Method::GET, "/intern/demos")
                .query(&[("intern_id", intern_id)]),
        )
        .await
    }

    async fn update_intern_demo_note(
        &self,
        demo_id: i64,
        intern_id: &str,
        note: &str,
    ) -> Result<(), PortalError> {
        self.notes(
            &format!("/intern/demos/{demo_id}/note"),
            &json!({ "intern_note": note, "intern_id": intern_id }),
        )
        .await
    }

    async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Vec<Notification>, PortalError> {
        let params = NotificationParams {
            limit: query.limit,
            recipient_id: query.recipient_id.as_deref(),
            unread_only: query.unread_only,
        };
        let path = format!("/notifications/{}", query.recipient.as_str());
        self.call_data(self.request(Method::GET, &path).query(&params))
            .await
    }

    async fn unread_count(
        &self,
        recipient: RecipientType,
        recipient_id: Option<&str>,
    ) -> Result<u32, PortalError> {
        let path = format!("/notifications/{}/unread-count", recipient.as_str());
        let body = self
            .call(
                self.request(Method::GET, &path)
                    .query(&RecipientParams { recipient_id }),
            )
            .await?;
        body.get("data")
            .and_then(|d| d.get("count"))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| PortalError::decode("unread count missing from response"))
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), PortalError> {
        self.call_unit(self.request(Method::PUT, &format!("/notifications/{id}/read")))
            .await
    }

    async fn mark_all_notifications_read(
        &self,
        recipient: RecipientType,
        recipient_id: Option<&str>,
    ) -> Result<(), PortalError> {
        let path = format!("/notifications/{}/mark-all-read", recipient.as_str());
        self.call_unit(
            self.request(Method::PUT, &path)
                .query(&RecipientParams { recipient_id }),
        )
        .await
    }

    async fn delete_notification(&self, id: i64) -> Result<(), PortalError> {
        self.call_unit(self.request(Method::DELETE, &format!("/notifications/{id}")))
            .await
    }
}
