pub mod credentials;
pub mod metrics;
pub mod notifications;
pub mod session;
pub mod sources;
pub mod view;

#[cfg(test)]
mod notifications_test;
#[cfg(test)]
mod session_test;
#[cfg(test)]
mod view_test;
