#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! L&D portal client core.
//!
//! The public API is defined in `ld-portal-sdk` and re-exported here.

pub use ld_portal_sdk::{PortalClientV1, PortalError};

pub mod config;
pub mod domain;
pub mod infra;

mod humantime_serde;

pub use config::{CliOverrides, ConfigError, PortalConfig};
pub use domain::credentials::{generate_password, generate_username};
pub use domain::notifications::{NotificationPoller, NotificationSnapshot};
pub use domain::session::{
    FileSessionStore, MemorySessionStore, PersistedSession, SessionContext, SessionError,
    SessionStore,
};
pub use domain::sources::{
    AdminCustomerRequests, AdminDemoAccounts, AdminInterns, InternDemoAccounts, InternRequests,
    RecordId, RecordSource,
};
pub use domain::view::{Clock, LoadOutcome, MutationOutcome, RecordCollectionView, SystemClock};
pub use infra::rest::RestPortalClient;
