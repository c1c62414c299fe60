//! Portal backend API trait.

use async_trait::async_trait;

use crate::errors::PortalError;
use crate::models::{
    Credentials, CustomerRequest, CustomerUpdate, DemoAccount, DemoCredentials, DemoUpdate, Intern,
    InternUpdate, LoginRequest, LoginResponse, NewIntern, Notification, NotificationQuery,
    ProjectUpdate, RecipientType, Registration, RegistrationReceipt, RequestStatus,
};

/// Typed access to the portal backend.
///
/// Every method performs exactly one request and never retries. Mutations
/// return once the backend acknowledged them; callers reload collections
/// themselves.
#[async_trait]
pub trait PortalClientV1: Send + Sync {
    // === Session ===

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, PortalError>;

    async fn logout(&self) -> Result<(), PortalError>;

    async fn register(&self, registration: &Registration)
    -> Result<RegistrationReceipt, PortalError>;

    // === Interns (admin) ===

    async fn list_interns(&self) -> Result<Vec<Intern>, PortalError>;

    /// Returns the new intern id when the backend reports one.
    async fn create_intern(&self, intern: &NewIntern) -> Result<Option<i64>, PortalError>;

    async fn update_intern(&self, id: i64, update: &InternUpdate) -> Result<(), PortalError>;

    async fn update_intern_credentials(
        &self,
        id: i64,
        credentials: &Credentials,
    ) -> Result<(), PortalError>;

    async fn delete_intern(&self, id: i64) -> Result<(), PortalError>;

    // === Customer requests (admin) ===

    async fn list_customer_requests(&self) -> Result<Vec<CustomerRequest>, PortalError>;

    /// Manually records a customer; returns the new request id when reported.
    async fn create_customer(&self, customer: &CustomerUpdate)
    -> Result<Option<i64>, PortalError>;

    async fn update_customer(&self, id: i64, update: &CustomerUpdate) -> Result<(), PortalError>;

    async fn delete_customer(&self, id: i64) -> Result<(), PortalError>;

    /// `None` unassigns the request.
    async fn assign_intern(&self, request_id: i64, intern_id: Option<i64>)
    -> Result<(), PortalError>;

    async fn update_request_status(
        &self,
        request_id: i64,
        status: &RequestStatus,
    ) -> Result<(), PortalError>;

    async fn update_project(&self, request_id: i64, update: &ProjectUpdate)
    -> Result<(), PortalError>;

    // === Demo accounts (admin) ===

    async fn list_demo_accounts(&self) -> Result<Vec<DemoAccount>, PortalError>;

    async fn update_demo_account(&self, id: i64, update: &DemoUpdate) -> Result<(), PortalError>;

    async fn delete_demo_account(&self, id: i64) -> Result<(), PortalError>;

    async fn regenerate_demo_credentials(&self, id: i64) -> Result<DemoCredentials, PortalError>;

    /// `None` unassigns the account.
    async fn assign_intern_to_demo(
        &self,
        demo_id: i64,
        intern_id: Option<i64>,
    ) -> Result<(), PortalError>;

    async fn update_demo_admin_note(&self, demo_id: i64, note: &str) -> Result<(), PortalError>;

    async fn update_demo_intern_note(&self, demo_id: i64, note: &str) -> Result<(), PortalError>;

    // === Intern workspace ===

    async fn intern_requests(&self, intern_id: &str) -> Result<Vec<CustomerRequest>, PortalError>;

    async fn update_request_intern_note(
        &self,
        request_id: i64,
        note: &str,
    ) -> Result<(), PortalError>;

    async fn intern_demo_accounts(&self, intern_id: &str) -> Result<Vec<DemoAccount>, PortalError>;

    async fn update_intern_demo_note(
        &self,
        demo_id: i64,
        intern_id: &str,
        note: &str,
    ) -> Result<(), PortalError>;

    // === Notifications ===

    async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Vec<Notification>, PortalError>;

    async fn unread_count(
        &self,
        recipient: RecipientType,
        recipient_id: Option<&str>,
    ) -> Result<u32, PortalError>;

    async fn mark_notification_read(&self, id: i64) -> Result<(), PortalError>;

    async fn mark_all_notifications_read(
        &self,
        recipient: RecipientType,
        recipient_id: Option<&str>,
    ) -> Result<(), PortalError>;

    async fn delete_notification(&self, id: i64) -> Result<(), PortalError>;
}
