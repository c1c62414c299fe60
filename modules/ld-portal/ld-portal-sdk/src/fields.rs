//! Filterable field descriptors of the portal records.

use chrono::{DateTime, Utc};
use ldp_query::{FieldKind, FieldValue, FilterField, Filterable};

use crate::models::{CustomerRequest, DemoAccount, Intern};

/// Derived demo account state exposed through [`DemoAccountField::State`].
pub const DEMO_ACTIVE: &str = "active";
pub const DEMO_EXPIRED: &str = "expired";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CustomerRequestField {
    FirstName,
    LastName,
    Company,
    Email,
    Phone,
    Status,
    IndustryDomain,
    PrimaryUseCase,
    PrimaryUseCaseType,
    AssignedInternName,
    DashboardsRequested,
    DashboardsDelivered,
    CreatedAt,
}

impl FilterField for CustomerRequestField {
    const FIELDS: &'static [Self] = &[
        CustomerRequestField::FirstName,
        CustomerRequestField::LastName,
        CustomerRequestField::Company,
        CustomerRequestField::Email,
        CustomerRequestField::Phone,
        CustomerRequestField::Status,
        CustomerRequestField::IndustryDomain,
        CustomerRequestField::PrimaryUseCase,
        CustomerRequestField::PrimaryUseCaseType,
        CustomerRequestField::AssignedInternName,
        CustomerRequestField::DashboardsRequested,
        CustomerRequestField::DashboardsDelivered,
        CustomerRequestField::CreatedAt,
    ];

    fn name(&self) -> &'static str {
        match self {
            CustomerRequestField::FirstName => "first_name",
            CustomerRequestField::LastName => "last_name",
            CustomerRequestField::Company => "company",
            CustomerRequestField::Email => "email",
            CustomerRequestField::Phone => "phone",
            CustomerRequestField::Status => "status",
            CustomerRequestField::IndustryDomain => "industry_domain",
            CustomerRequestField::PrimaryUseCase => "primary_use_case",
            CustomerRequestField::PrimaryUseCaseType => "primary_use_case_type",
            CustomerRequestField::AssignedInternName => "assigned_intern_name",
            CustomerRequestField::DashboardsRequested => "dashboards_requested",
            CustomerRequestField::DashboardsDelivered => "dashboards_delivered",
            CustomerRequestField::CreatedAt => "created_at",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            CustomerRequestField::DashboardsRequested
            | CustomerRequestField::DashboardsDelivered => FieldKind::Count,
            CustomerRequestField::CreatedAt => FieldKind::DateTime,
            _ => FieldKind::Text,
        }
    }
}

impl Filterable for CustomerRequest {
    type Field = CustomerRequestField;

    fn field(&self, field: Self::Field, _now: DateTime<Utc>) -> FieldValue<'_> {
        match field {
            CustomerRequestField::FirstName => FieldValue::text(&self.first_name),
            CustomerRequestField::LastName => FieldValue::text(&self.last_name),
            CustomerRequestField::Company => FieldValue::text(&self.company),
            CustomerRequestField::Email => FieldValue::text(&self.email),
            CustomerRequestField::Phone => FieldValue::opt_text(self.phone.as_deref()),
            CustomerRequestField::Status => FieldValue::text(self.status.as_str()),
            CustomerRequestField::IndustryDomain => {
                FieldValue::opt_text(self.industry_domain.as_deref())
            }
            CustomerRequestField::PrimaryUseCase => {
                FieldValue::opt_text(self.primary_use_case.as_deref())
            }
            CustomerRequestField::PrimaryUseCaseType => {
                FieldValue::opt_text(self.primary_use_case_type.as_deref())
            }
            CustomerRequestField::AssignedInternName => {
                FieldValue::opt_text(self.assigned_intern_name.as_deref())
            }
            CustomerRequestField::DashboardsRequested => {
                FieldValue::opt_count(self.dashboards_requested)
            }
            CustomerRequestField::DashboardsDelivered => {
                FieldValue::opt_count(self.dashboards_delivered)
            }
            CustomerRequestField::CreatedAt => FieldValue::opt_datetime(self.created_at),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DemoAccountField {
    FirstName,
    LastName,
    Company,
    Email,
    Phone,
    Username,
    IndustryDomain,
    SelectedIntegrations,
    /// `"active"` or `"expired"`, derived from the flag and the expiry.
    State,
    ExpiresAt,
    CreatedAt,
}

impl FilterField for DemoAccountField {
    const FIELDS: &'static [Self] = &[
        DemoAccountField::FirstName,
        DemoAccountField::LastName,
        DemoAccountField::Company,
        DemoAccountField::Email,
        DemoAccountField::Phone,
        DemoAccountField::Username,
        DemoAccountField::IndustryDomain,
        DemoAccountField::SelectedIntegrations,
        DemoAccountField::State,
        DemoAccountField::ExpiresAt,
        DemoAccountField::CreatedAt,
    ];

    fn name(&self) -> &'static str {
        match self {
            DemoAccountField::FirstName => "first_name",
            DemoAccountField::LastName => "last_name",
            DemoAccountField::Company => "company",
            DemoAccountField::Email => "email",
            DemoAccountField::Phone => "phone",
            DemoAccountField::Username => "username",
            DemoAccountField::IndustryDomain => "industry_domain",
            DemoAccountField::SelectedIntegrations => "selected_integrations",
            DemoAccountField::State => "state",
            DemoAccountField::ExpiresAt => "expires_at",
            DemoAccountField::CreatedAt => "created_at",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            DemoAccountField::SelectedIntegrations => FieldKind::List,
            DemoAccountField::ExpiresAt | DemoAccountField::CreatedAt => FieldKind::DateTime,
            _ => FieldKind::Text,
        }
    }
}

impl Filterable for DemoAccount {
    type Field = DemoAccountField;

    fn field(&self, field: Self::Field, now: DateTime<Utc>) -> FieldValue<'_> {
        match field {
            DemoAccountField::FirstName => FieldValue::text(&self.first_name),
            DemoAccountField::LastName => FieldValue::text(&self.last_name),
            DemoAccountField::Company => FieldValue::text(&self.company),
            DemoAccountField::Email => FieldValue::text(&self.email),
            DemoAccountField::Phone => FieldValue::opt_text(self.phone.as_deref()),
            DemoAccountField::Username => FieldValue::text(&self.username),
            DemoAccountField::IndustryDomain => {
                FieldValue::opt_text(self.industry_domain.as_deref())
            }
            DemoAccountField::SelectedIntegrations => {
                FieldValue::List(&self.selected_integrations)
            }
            DemoAccountField::State => FieldValue::text(if self.is_effectively_active(now) {
                DEMO_ACTIVE
            } else {
                DEMO_EXPIRED
            }),
            DemoAccountField::ExpiresAt => FieldValue::opt_datetime(self.expires_at),
            DemoAccountField::CreatedAt => FieldValue::opt_datetime(self.created_at),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InternField {
    Name,
    Email,
    Username,
    Phone,
    Specialization,
    Integrations,
    CustomerCompanies,
    AssignedCount,
    CompletedCount,
    SuccessRate,
    CreatedAt,
}

impl FilterField for InternField {
    const FIELDS: &'static [Self] = &[
        InternField::Name,
        InternField::Email,
        InternField::Username,
        InternField::Phone,
        InternField::Specialization,
        InternField::Integrations,
        InternField::CustomerCompanies,
        InternField::AssignedCount,
        InternField::CompletedCount,
        InternField::SuccessRate,
        InternField::CreatedAt,
    ];

    fn name(&self) -> &'static str {
        match self {
            InternField::Name => "name",
            InternField::Email => "email",
            InternField::Username => "username",
            InternField::Phone => "phone",
            InternField::Specialization => "specialization",
            InternField::Integrations => "integrations",
            InternField::CustomerCompanies => "customer_companies",
            InternField::AssignedCount => "assigned_count",
            InternField::CompletedCount => "completed_count",
            InternField::SuccessRate => "success_rate",
            InternField::CreatedAt => "created_at",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            InternField::Integrations | InternField::CustomerCompanies => FieldKind::List,
            InternField::AssignedCount | InternField::CompletedCount => FieldKind::Count,
            InternField::SuccessRate => FieldKind::Number,
            InternField::CreatedAt => FieldKind::DateTime,
            _ => FieldKind::Text,
        }
    }
}

impl Filterable for Intern {
    type Field = InternField;

    fn field(&self, field: Self::Field, _now: DateTime<Utc>) -> FieldValue<'_> {
        match field {
            InternField::Name => FieldValue::text(&self.name),
            InternField::Email => FieldValue::text(&self.email),
            InternField::Username => FieldValue::text(&self.username),
            InternField::Phone => FieldValue::opt_text(self.phone.as_deref()),
            InternField::Specialization => FieldValue::text(self.specialization.as_str()),
            InternField::Integrations => FieldValue::List(&self.integrations),
            InternField::CustomerCompanies => FieldValue::List(&self.customer_companies),
            InternField::AssignedCount => FieldValue::Count(u64::from(self.assigned_count)),
            InternField::CompletedCount => FieldValue::Count(u64::from(self.completed_count)),
            InternField::SuccessRate => FieldValue::opt_number(self.success_rate),
            InternField::CreatedAt => FieldValue::opt_datetime(self.created_at),
        }
    }
}
