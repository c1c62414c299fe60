//! Remote collections backing the dashboard views.
//!
//! A source binds a [`PortalClientV1`] to one collection: how it is fetched
//! and which mutations the console offers for it. Mutations a collection does
//! not offer fail with [`PortalError::Unsupported`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ld_portal_sdk::{
    CustomerRequest, DEMO_ACTIVE, DEMO_EXPIRED, DemoAccount, DemoUpdate, Intern, NoteKind,
    PortalClientV1, PortalError, ProjectUpdate, RequestStatus,
};
use ldp_query::Filterable;

/// Stable backend id of a record.
pub trait RecordId {
    fn record_id(&self) -> i64;
}

impl RecordId for CustomerRequest {
    fn record_id(&self) -> i64 {
        self.id
    }
}

impl RecordId for DemoAccount {
    fn record_id(&self) -> i64 {
        self.id
    }
}

impl RecordId for Intern {
    fn record_id(&self) -> i64 {
        self.id
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Filterable + RecordId + Send + Sync + 'static;

    /// Short collection name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<Self::Record>, PortalError>;

    async fn update_status(
        &self,
        _record: &Self::Record,
        _status: &str,
        _now: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        Err(PortalError::unsupported("update_status"))
    }

    /// `None` unassigns.
    async fn assign_intern(
        &self,
        _record: &Self::Record,
        _intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        Err(PortalError::unsupported("assign_intern"))
    }

    async fn update_note(
        &self,
        _record: &Self::Record,
        _kind: NoteKind,
        _text: &str,
    ) -> Result<(), PortalError> {
        Err(PortalError::unsupported("update_note"))
    }

    async fn delete(&self, _record: &Self::Record) -> Result<(), PortalError> {
        Err(PortalError::unsupported("delete"))
    }
}

/// All customer requests, as seen by the admin.
#[derive(Clone)]
pub struct AdminCustomerRequests {
    client: Arc<dyn PortalClientV1>,
}

impl AdminCustomerRequests {
    #[must_use]
    pub fn new(client: Arc<dyn PortalClientV1>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for AdminCustomerRequests {
    type Record = CustomerRequest;

    fn name(&self) -> &'static str {
        "customer_requests"
    }

    async fn fetch(&self) -> Result<Vec<CustomerRequest>, PortalError> {
        self.client.list_customer_requests().await
    }

    async fn update_status(
        &self,
        record: &CustomerRequest,
        status: &str,
        _now: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        let status = RequestStatus::from(status.trim());
        self.client.update_request_status(record.id, &status).await
    }

    async fn assign_intern(
        &self,
        record: &CustomerRequest,
        intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        self.client.assign_intern(record.id, intern_id).await
    }

    async fn update_note(
        &self,
        record: &CustomerRequest,
        kind: NoteKind,
        text: &str,
    ) -> Result<(), PortalError> {
        match kind {
            NoteKind::Admin => {
                let update = ProjectUpdate {
                    admin_note: Some(text.to_owned()),
                    ..ProjectUpdate::default()
                };
                self.client.update_project(record.id, &update).await
            }
            NoteKind::Intern => Err(PortalError::unsupported("update_note(intern)")),
        }
    }

    async fn delete(&self, record: &CustomerRequest) -> Result<(), PortalError> {
        self.client.delete_customer(record.id).await
    }
}

/// All demo accounts, as seen by the admin.
#[derive(Clone)]
pub struct AdminDemoAccounts {
    client: Arc<dyn PortalClientV1>,
}

impl AdminDemoAccounts {
    #[must_use]
    pub fn new(client: Arc<dyn PortalClientV1>) -> Self {
        Self { client }
    }
}

/// Maps a demo state name to the activation flag.
fn demo_activation(status: &str) -> Result<bool, PortalError> {
    match status.trim().to_ascii_lowercase().as_str() {
        DEMO_ACTIVE => Ok(true),
        DEMO_EXPIRED | "inactive" => Ok(false),
        other => Err(PortalError::validation(format!(
            "demo account state must be '{DEMO_ACTIVE}' or '{DEMO_EXPIRED}', got '{other}'"
        ))),
    }
}

#[async_trait]
impl RecordSource for AdminDemoAccounts {
    type Record = DemoAccount;

    fn name(&self) -> &'static str {
        "demo_accounts"
    }

    async fn fetch(&self) -> Result<Vec<DemoAccount>, PortalError> {
        self.client.list_demo_accounts().await
    }

    /// Activation restarts the trial window from `now`.
    async fn update_status(
        &self,
        record: &DemoAccount,
        status: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        let active = demo_activation(status)?;
        let update = DemoUpdate::with_activation(record, active, now);
        self.client.update_demo_account(record.id, &update).await
    }

    async fn assign_intern(
        &self,
        record: &DemoAccount,
        intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        self.client.assign_intern_to_demo(record.id, intern_id).await
    }

    async fn update_note(
        &self,
        record: &DemoAccount,
        kind: NoteKind,
        text: &str,
    ) -> Result<(), PortalError> {
        match kind {
            NoteKind::Admin => self.client.update_demo_admin_note(record.id, text).await,
            NoteKind::Intern => self.client.update_demo_intern_note(record.id, text).await,
        }
    }

    async fn delete(&self, record: &DemoAccount) -> Result<(), PortalError> {
        self.client.delete_demo_account(record.id).await
    }
}

/// The intern roster.
#[derive(Clone)]
pub struct AdminInterns {
    client: Arc<dyn PortalClientV1>,
}

impl AdminInterns {
    #[must_use]
    pub fn new(client: Arc<dyn PortalClientV1>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for AdminInterns {
    type Record = Intern;

    fn name(&self) -> &'static str {
        "interns"
    }

    async fn fetch(&self) -> Result<Vec<Intern>, PortalError> {
        self.client.list_interns().await
    }

    async fn delete(&self, record: &Intern) -> Result<(), PortalError> {
        self.client.delete_intern(record.id).await
    }
}

/// Customer requests assigned to one intern.
#[derive(Clone)]
pub struct InternRequests {
    client: Arc<dyn PortalClientV1>,
    intern_id: String,
}

impl InternRequests {
    pub fn new(client: Arc<dyn PortalClientV1>, intern_id: impl Into<String>) -> Self {
        Self {
            client,
            intern_id: intern_id.into(),
        }
    }
}

#[async_trait]
impl RecordSource for InternRequests {
    type Record = CustomerRequest;

    fn name(&self) -> &'static str {
        "intern_requests"
    }

    async fn fetch(&self) -> Result<Vec<CustomerRequest>, PortalError> {
        self.client.intern_requests(&self.intern_id).await
    }

    async fn update_note(
        &self,
        record: &CustomerRequest,
        kind: NoteKind,
        text: &str,
    ) -> Result<(), PortalError> {
        match kind {
            NoteKind::Intern => self.client.update_request_intern_note(record.id, text).await,
            NoteKind::Admin => Err(PortalError::unsupported("update_note(admin)")),
        }
    }
}

/// Demo accounts assigned to one intern.
#[derive(Clone)]
pub struct InternDemoAccounts {
    client: Arc<dyn PortalClientV1>,
    intern_id: String,
}

impl InternDemoAccounts {
    pub fn new(client: Arc<dyn PortalClientV1>, intern_id: impl Into<String>) -> Self {
        Self {
            client,
            intern_id: intern_id.into(),
        }
    }
}

#[async_trait]
impl RecordSource for InternDemoAccounts {
    type Record = DemoAccount;

    fn name(&self) -> &'static str {
        "intern_demo_accounts"
    }

    async fn fetch(&self) -> Result<Vec<DemoAccount>, PortalError> {
        self.client.intern_demo_accounts(&self.intern_id).await
    }

    async fn update_note(
        &self,
        record: &DemoAccount,
        kind: NoteKind,
        text: &str,
    ) -> Result<(), PortalError> {
        match kind {
            NoteKind::Intern => {
                self.client
                    .update_intern_demo_note(record.id, &self.intern_id, text)
                    .await
            }
            NoteKind::Admin => Err(PortalError::unsupported("update_note(admin)")),
        }
    }
}
