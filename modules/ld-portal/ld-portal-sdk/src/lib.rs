#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! L&D portal SDK
//!
//! Client-facing contract of the portal backend.
//!
//! ## API Traits
//!
//! - [`PortalClientV1`] - one async method per backend endpoint
//!
//! ## Records
//!
//! [`CustomerRequest`], [`DemoAccount`] and [`Intern`] implement
//! [`ldp_query::Filterable`] through the field enums in [`fields`], so any
//! collection of them can be filtered and aggregated directly.
//!
//! ## Usage
//!
//! ```ignore
//! use ld_portal_sdk::PortalClientV1;
//!
//! let requests = client.list_customer_requests().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod constants;
pub mod errors;
pub mod fields;
pub mod models;
mod serde_helpers;


pub use api::PortalClientV1;
pub use errors::PortalError;
pub use fields::{CustomerRequestField, DEMO_ACTIVE, DEMO_EXPIRED, DemoAccountField, InternField};
pub use models::{
    AccountType, Credentials, CustomerRequest, CustomerUpdate, DemoAccount, DemoCredentials,
    DemoUpdate, Intern, InternUpdate, LoginRequest, LoginResponse, NewIntern, NoteKind,
    Notification, NotificationQuery, ProjectUpdate, RecipientType, Registration,
    RegistrationReceipt, RequestStatus, Role, Secret, Specialization, UserIdentity,
};
