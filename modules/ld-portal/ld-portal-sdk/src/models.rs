use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::DEMO_ACCOUNT_DAYS;
use crate::serde_helpers;

/// Opaque secret: a password or a session token.
///
/// `Debug` never shows the value. `Serialize` writes the plain value and is
/// only used for request payloads and the local session file.
pub struct Secret(SecretString);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Lifecycle of a customer request. Unknown backend values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RequestStatus {
    #[default]
    Pending,
    Assigned,
    InProgress,
    Review,
    Completed,
    OnHold,
    Other(String),
}

impl RequestStatus {
    pub const KNOWN: &'static [RequestStatus] = &[
        RequestStatus::Pending,
        RequestStatus::Assigned,
        RequestStatus::InProgress,
        RequestStatus::Review,
        RequestStatus::Completed,
        RequestStatus::OnHold,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Assigned => "assigned",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Review => "review",
            RequestStatus::Completed => "completed",
            RequestStatus::OnHold => "on-hold",
            RequestStatus::Other(s) => s,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }

    /// Assigned or actively worked on.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self, RequestStatus::Assigned | RequestStatus::InProgress)
    }
}

impl From<&str> for RequestStatus {
    fn from(value: &str) -> Self {
        match value {
            "" | "pending" => RequestStatus::Pending,
            "assigned" => RequestStatus::Assigned,
            "in-progress" => RequestStatus::InProgress,
            "review" => RequestStatus::Review,
            "completed" => RequestStatus::Completed,
            "on-hold" => RequestStatus::OnHold,
            other => RequestStatus::Other(other.to_owned()),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_helpers::text(deserializer).map(|s| Self::from(s.as_str()))
    }
}

/// Intern track. Unknown backend values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Specialization {
    #[default]
    Ld,
    Demo,
    Other(String),
}

impl Specialization {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Specialization::Ld => "L&D",
            Specialization::Demo => "Demo",
            Specialization::Other(s) => s,
        }
    }
}

impl From<&str> for Specialization {
    fn from(value: &str) -> Self {
        match value {
            "" | "L&D" => Specialization::Ld,
            "Demo" => Specialization::Demo,
            other => Specialization::Other(other.to_owned()),
        }
    }
}

impl FromStr for Specialization {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Specialization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Specialization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_helpers::text(deserializer).map(|s| Self::from(s.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Intern,
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Intern => "intern",
            Role::Customer => "customer",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Ld,
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    Admin,
    Intern,
}

impl RecipientType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientType::Admin => "admin",
            RecipientType::Intern => "intern",
        }
    }
}

/// Which of the two note slots on a record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Admin,
    Intern,
}

impl NoteKind {
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            NoteKind::Admin => "admin_note",
            NoteKind::Intern => "intern_note",
        }
    }
}

/// Authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(deserialize_with = "serde_helpers::text")]
    pub id: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerRequest {
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub first_name: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub last_name: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub email: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub company: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub industry_domain: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub primary_use_case: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub primary_use_case_type: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub account_type: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "serde_helpers::opt_id")]
    pub assigned_intern_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub assigned_intern_name: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::number")]
    pub customer_satisfaction_score: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub admin_note: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub intern_note: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::count")]
    pub dashboards_requested: Option<u32>,
    #[serde(default, deserialize_with = "serde_helpers::count")]
    pub dashboards_delivered: Option<u32>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub project_type: Option<String>,
}

impl CustomerRequest {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    #[must_use]
    pub fn is_pilot(&self) -> bool {
        self.project_type.as_deref() == Some("pilot")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoAccount {
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub first_name: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub last_name: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub email: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub company: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub industry_domain: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::string_list")]
    pub selected_integrations: Vec<String>,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub username: String,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default, deserialize_with = "serde_helpers::flag")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::opt_id")]
    pub assigned_intern_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub admin_note: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub intern_note: Option<String>,
}

impl DemoAccount {
    /// Derived state shown on the dashboards.
    ///
    /// Active only when the stored flag is set and `now` is before
    /// `expires_at`. An account without an expiry is treated as expired.
    #[must_use]
    pub fn is_effectively_active(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_some_and(|expires| now < expires)
    }

    /// Whole days left before expiry, or `None` once expired.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .filter(|expires| now < *expires)
            .map(|expires| expires.signed_duration_since(now).num_days())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Intern {
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub username: String,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub email: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialization: Specialization,
    #[serde(default, deserialize_with = "serde_helpers::string_list")]
    pub integrations: Vec<String>,
    #[serde(default, deserialize_with = "serde_helpers::string_list")]
    pub customer_companies: Vec<String>,
    #[serde(default, deserialize_with = "serde_helpers::count_or_zero")]
    pub assigned_count: u32,
    #[serde(default, deserialize_with = "serde_helpers::count_or_zero")]
    pub completed_count: u32,
    #[serde(default, deserialize_with = "serde_helpers::number")]
    pub success_rate: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_type: RecipientType,
    #[serde(default, deserialize_with = "serde_helpers::opt_id")]
    pub recipient_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub title: String,
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub message: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub notification_type: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::flag")]
    pub read_status: bool,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters of a notification listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub recipient: RecipientType,
    pub recipient_id: Option<String>,
    pub limit: u32,
    pub unread_only: bool,
}

impl NotificationQuery {
    #[must_use]
    pub fn new(recipient: RecipientType, recipient_id: Option<String>, limit: u32) -> Self {
        Self {
            recipient,
            recipient_id,
            limit,
            unread_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: Secret,
}

/// Top-level fields of a successful login envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: UserIdentity,
    #[serde(default)]
    pub token: Option<Secret>,
}

/// Self-service registration form.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_use_case: Option<String>,
    /// `"custom"` when `primary_use_case` is free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_use_case_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_integrations: Vec<String>,
    pub account_type: AccountType,
}

/// Top-level fields of a successful registration envelope.
///
/// Demo registrations also carry the generated credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationReceipt {
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub message: String,
    #[serde(default, deserialize_with = "serde_helpers::opt_id")]
    pub request_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::opt_text")]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIntern {
    pub name: String,
    pub username: String,
    pub password: Secret,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub specialization: Specialization,
    pub integrations: Vec<String>,
}

/// Partial intern update; unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InternUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Specialization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// Credentials issued for a demo account.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoCredentials {
    #[serde(default, deserialize_with = "serde_helpers::text")]
    pub username: String,
    pub password: Secret,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Contact fields of a customer request, edited by the admin.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_domain: Option<String>,
}

impl From<&CustomerRequest> for CustomerUpdate {
    fn from(r: &CustomerRequest) -> Self {
        Self {
            first_name: r.first_name.clone(),
            last_name: r.last_name.clone(),
            email: r.email.clone(),
            company: r.company.clone(),
            phone: r.phone.clone(),
            industry_domain: r.industry_domain.clone(),
        }
    }
}

/// Project tracking fields of a customer request; unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboards_requested: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboards_delivered: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_satisfaction_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

/// Admin edit of a demo account, including activation.
#[derive(Debug, Clone, Serialize)]
pub struct DemoUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_domain: Option<String>,
    pub selected_integrations: Vec<String>,
    /// Sent as `0`/`1`.
    #[serde(serialize_with = "serialize_flag")]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl DemoUpdate {
    /// Keeps the account's contact fields and sets its activation.
    ///
    /// Activating restarts the trial window from `now`.
    #[must_use]
    pub fn with_activation(demo: &DemoAccount, active: bool, now: DateTime<Utc>) -> Self {
        Self {
            first_name: demo.first_name.clone(),
            last_name: demo.last_name.clone(),
            email: demo.email.clone(),
            company: demo.company.clone(),
            phone: demo.phone.clone(),
            industry_domain: demo.industry_domain.clone(),
            selected_integrations: demo.selected_integrations.clone(),
            is_active: active,
            expires_at: active.then(|| now + Duration::days(DEMO_ACCOUNT_DAYS)),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}
