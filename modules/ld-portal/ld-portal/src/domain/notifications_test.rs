use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ld_portal_sdk::{
    Credentials, CustomerRequest, CustomerUpdate, DemoAccount, DemoCredentials, DemoUpdate, Intern,
    InternUpdate, LoginRequest, LoginResponse, NewIntern, Notification, NotificationQuery,
    PortalClientV1, PortalError, ProjectUpdate, RecipientType, Registration, RegistrationReceipt,
    RequestStatus,
};
use parking_lot::Mutex;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

use super::notifications::NotificationPoller;
use crate::config::NotificationConfig;

/// Backend that only answers the notification endpoints.
#[derive(Default)]
struct Bell {
    polls: AtomicUsize,
    failing: AtomicBool,
    items: Mutex<Vec<Notification>>,
    unread: Mutex<u32>,
    marked: Mutex<Vec<i64>>,
    marked_all: AtomicBool,
    deleted: Mutex<Vec<i64>>,
}

impl Bell {
    fn with_unread(unread: u32) -> Arc<Self> {
        Self::with_items(vec![notification(1, false), notification(2, false)], unread)
    }

    fn with_items(items: Vec<Notification>, unread: u32) -> Arc<Self> {
        let bell = Self::default();
        *bell.items.lock() = items;
        *bell.unread.lock() = unread;
        Arc::new(bell)
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

fn notification(id: i64, read: bool) -> Notification {
    serde_json::from_value(json!({
        "id": id,
        "recipient_type": "intern",
        "recipient_id": 7,
        "title": format!("Notice {id}"),
        "message": "New assignment",
        "read_status": i32::from(read),
    }))
    .unwrap()
}

fn unsupported<T>(operation: &'static str) -> Result<T, PortalError> {
    Err(PortalError::unsupported(operation))
}

#[async_trait]
impl PortalClientV1 for Bell {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, PortalError> {
        unsupported("login")
    }

    async fn logout(&self) -> Result<(), PortalError> {
        unsupported("logout")
    }

    async fn register(
        &self,
        _registration: &Registration,
    ) -> Result<RegistrationReceipt, PortalError> {
        unsupported("register")
    }

    async fn list_interns(&self) -> Result<Vec<Intern>, PortalError> {
        unsupported("list_interns")
    }

    async fn create_intern(&self, _intern: &NewIntern) -> Result<Option<i64>, PortalError> {
        unsupported("create_intern")
    }

    async fn update_intern(&self, _id: i64, _update: &InternUpdate) -> Result<(), PortalError> {
        unsupported("update_intern")
    }

    async fn update_intern_credentials(
        &self,
        _id: i64,
        _credentials: &Credentials,
    ) -> Result<(), PortalError> {
        unsupported("update_intern_credentials")
    }

    async fn delete_intern(&self, _id: i64) -> Result<(), PortalError> {
        unsupported("delete_intern")
    }

    async fn list_customer_requests(&self) -> Result<Vec<CustomerRequest>, PortalError> {
        unsupported("list_customer_requests")
    }

    async fn create_customer(
        &self,
        _customer: &CustomerUpdate,
    ) -> Result<Option<i64>, PortalError> {
        unsupported("create_customer")
    }

    async fn update_customer(
        &self,
        _id: i64,
        _update: &CustomerUpdate,
    ) -> Result<(), PortalError> {
        unsupported("update_customer")
    }

    async fn delete_customer(&self, _id: i64) -> Result<(), PortalError> {
        unsupported("delete_customer")
    }

    async fn assign_intern(
        &self,
        _request_id: i64,
        _intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        unsupported("assign_intern")
    }

    async fn update_request_status(
        &self,
        _request_id: i64,
        _status: &RequestStatus,
    ) -> Result<(), PortalError> {
        unsupported("update_request_status")
    }

    async fn update_project(
        &self,
        _request_id: i64,
        _update: &ProjectUpdate,
    ) -> Result<(), PortalError> {
        unsupported("update_project")
    }

    async fn list_demo_accounts(&self) -> Result<Vec<DemoAccount>, PortalError> {
        unsupported("list_demo_accounts")
    }

    async fn update_demo_account(&self, _id: i64, _update: &DemoUpdate) -> Result<(), PortalError> {
        unsupported("update_demo_account")
    }

    async fn delete_demo_account(&self, _id: i64) -> Result<(), PortalError> {
        unsupported("delete_demo_account")
    }

    async fn regenerate_demo_credentials(&self, _id: i64) -> Result<DemoCredentials, PortalError> {
        unsupported("regenerate_demo_credentials")
    }

    async fn assign_intern_to_demo(
        &self,
        _demo_id: i64,
        _intern_id: Option<i64>,
    ) -> Result<(), PortalError> {
        unsupported("assign_intern_to_demo")
    }

    async fn update_demo_admin_note(&self, _demo_id: i64, _note: &str) -> Result<(), PortalError> {
        unsupported("update_demo_admin_note")
    }

    async fn update_demo_intern_note(&self, _demo_id: i64, _note: &str) -> Result<(), PortalError> {
        unsupported("update_demo_intern_note")
    }

    async fn intern_requests(&self, _intern_id: &str) -> Result<Vec<CustomerRequest>, PortalError> {
        unsupported("intern_requests")
    }

    async fn update_request_intern_note(
        &self,
        _request_id: i64,
        _note: &str,
    ) -> Result<(), PortalError> {
        unsupported("update_request_intern_note")
    }

    async fn intern_demo_accounts(&self, _intern_id: &str) -> Result<Vec<DemoAccount>, PortalError> {
        unsupported("intern_demo_accounts")
    }

    async fn update_intern_demo_note(
        &self,
        _demo_id: i64,
        _intern_id: &str,
        _note: &str,
    ) -> Result<(), PortalError> {
        unsupported("update_intern_demo_note")
    }

    async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Vec<Notification>, PortalError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortalError::transport("connection refused"));
        }
        assert_eq!(query.recipient, RecipientType::Intern);
        assert_eq!(query.recipient_id.as_deref(), Some("7"));
        assert_eq!(query.limit, 20);
        Ok(self.items.lock().clone())
    }

    async fn unread_count(
        &self,
        _recipient: RecipientType,
        _recipient_id: Option<&str>,
    ) -> Result<u32, PortalError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortalError::transport("connection refused"));
        }
        Ok(*self.unread.lock())
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), PortalError> {
        self.marked.lock().push(id);
        Ok(())
    }

    async fn mark_all_notifications_read(
        &self,
        recipient: RecipientType,
        recipient_id: Option<&str>,
    ) -> Result<(), PortalError> {
        assert_eq!(recipient, RecipientType::Intern);
        assert_eq!(recipient_id, Some("7"));
        self.marked_all.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_notification(&self, id: i64) -> Result<(), PortalError> {
        self.deleted.lock().push(id);
        Ok(())
    }
}

fn config(poll_interval: Duration) -> NotificationConfig {
    NotificationConfig {
        poll_interval,
        limit: 20,
    }
}

fn poller(bell: &Arc<Bell>, poll_interval: Duration) -> NotificationPoller {
    NotificationPoller::new(
        bell.clone(),
        RecipientType::Intern,
        Some("7".to_owned()),
        &config(poll_interval),
    )
}

#[tokio::test]
async fn first_snapshot_is_published_immediately() {
    let bell = Bell::with_unread(2);
    let poller = poller(&bell, Duration::from_secs(3600));
    let mut rx = poller.subscribe();

    let handle = poller.spawn();
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("no snapshot published")
        .unwrap();

    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.unread, 2);

    poller.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller did not stop")
        .unwrap();
    assert_eq!(bell.polls(), 1);
}

#[tokio::test]
async fn parent_cancellation_stops_the_poller() {
    let bell = Bell::with_unread(0);
    let parent = CancellationToken::new();
    let poller = poller(&bell, Duration::from_millis(10)).with_cancellation(&parent);

    let handle = poller.spawn();
    parent.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller did not stop")
        .unwrap();

    assert!(poller.is_cancelled());
    let polls = bell.polls();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(bell.polls(), polls);
}

#[tokio::test]
#[traced_test]
async fn failed_poll_keeps_previous_snapshot() {
    let bell = Bell::with_unread(3);
    let poller = poller(&bell, Duration::from_millis(5));
    poller.refresh().await.unwrap();

    bell.failing.store(true, Ordering::SeqCst);
    let before = bell.polls();
    tokio::join!(poller.run(), async {
        while bell.polls() < before + 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        poller.cancel();
    });

    let snapshot = poller.snapshot();
    assert_eq!(snapshot.unread, 3);
    assert_eq!(snapshot.items.len(), 2);
    assert!(logs_contain("notification poll failed"));
}

#[tokio::test]
async fn mark_read_decrements_without_going_negative() {
    let bell = Bell::with_unread(1);
    let poller = poller(&bell, Duration::from_secs(3600));
    poller.refresh().await.unwrap();

    poller.mark_read(1).await.unwrap();
    poller.mark_read(2).await.unwrap();

    let snapshot = poller.snapshot();
    assert_eq!(snapshot.unread, 0);
    assert!(snapshot.items.iter().all(|n| n.read_status));
    assert_eq!(*bell.marked.lock(), vec![1, 2]);
}

#[tokio::test]
async fn mark_all_read_zeroes_the_counter() {
    let bell = Bell::with_unread(5);
    let poller = poller(&bell, Duration::from_secs(3600));
    poller.refresh().await.unwrap();

    poller.mark_all_read().await.unwrap();

    assert_eq!(poller.snapshot().unread, 0);
    assert!(bell.marked_all.load(Ordering::SeqCst));
}

#[tokio::test]
async fn mark_read_of_a_read_item_keeps_the_counter() {
    let bell = Bell::with_items(vec![notification(1, false), notification(2, true)], 1);
    let poller = poller(&bell, Duration::from_secs(3600));
    poller.refresh().await.unwrap();

    poller.mark_read(2).await.unwrap();
    assert_eq!(poller.snapshot().unread, 1);

    poller.mark_read(1).await.unwrap();
    poller.mark_read(1).await.unwrap();
    assert_eq!(poller.snapshot().unread, 0);
    assert_eq!(*bell.marked.lock(), vec![2, 1, 1]);
}

#[tokio::test]
async fn delete_drops_the_item_and_counts_only_unread() {
    let bell = Bell::with_items(vec![notification(1, false), notification(2, true)], 1);
    let poller = poller(&bell, Duration::from_secs(3600));
    poller.refresh().await.unwrap();

    poller.delete(2).await.unwrap();
    let snapshot = poller.snapshot();
    assert_eq!(snapshot.unread, 1);
    assert_eq!(snapshot.items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1]);

    poller.delete(1).await.unwrap();
    let snapshot = poller.snapshot();
    assert_eq!(snapshot.unread, 0);
    assert!(snapshot.items.is_empty());
    assert_eq!(*bell.deleted.lock(), vec![2, 1]);
}
