use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ld_portal_sdk::{CustomerRequest, NoteKind, PortalError};
use ldp_query::{Dimension, FilterError};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

use super::metrics::{admin_customer_metrics, customer_request_fields};
use super::sources::RecordSource;
use super::view::{Clock, LoadOutcome, MutationOutcome, RecordCollectionView};

type Fetch = Result<Vec<CustomerRequest>, PortalError>;

/// Source answering fetches from a queue and recording mutations.
#[derive(Default)]
struct Scripted {
    fetches: AtomicUsize,
    responses: Mutex<VecDeque<Fetch>>,
    statuses: Mutex<Vec<(i64, String, DateTime<Utc>)>>,
    reject_status: Mutex<Option<PortalError>>,
    gate: Option<Arc<Notify>>,
}

impl Scripted {
    fn queue(responses: Vec<Fetch>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        })
    }

    fn gated(gate: Arc<Notify>, responses: Vec<Fetch>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            gate: Some(gate),
            ..Self::default()
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for Scripted {
    type Record = CustomerRequest;

    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self) -> Fetch {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update_status(
        &self,
        record: &CustomerRequest,
        status: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        if let Some(e) = self.reject_status.lock().take() {
            return Err(e);
        }
        self.statuses.lock().push((record.id, status.to_owned(), now));
        Ok(())
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn request(id: i64, status: &str, delivered: u32) -> CustomerRequest {
    serde_json::from_value(json!({
        "id": id,
        "first_name": format!("Customer{id}"),
        "last_name": "Doe",
        "email": format!("c{id}@example.com"),
        "company": format!("Company {id}"),
        "status": status,
        "dashboards_delivered": delivered,
        "created_at": "2025-03-01T10:00:00"
    }))
    .unwrap()
}

fn view(source: Arc<Scripted>) -> RecordCollectionView<CustomerRequest> {
    RecordCollectionView::new(source, customer_request_fields(), admin_customer_metrics())
}

#[tokio::test]
async fn load_replaces_the_collection() {
    let source = Scripted::queue(vec![Ok(vec![request(1, "pending", 0), request(2, "completed", 2)])]);
    let mut view = view(source.clone());

    assert_eq!(view.load().await, LoadOutcome::Loaded(2));
    assert_eq!(view.len(), 2);
    assert!(view.error().is_none());
    assert!(!view.is_loading());
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn failed_load_keeps_previous_records() {
    let source = Scripted::queue(vec![
        Ok(vec![request(1, "pending", 0)]),
        Err(PortalError::transport("connection reset")),
    ]);
    let mut view = view(source);
    view.load().await;

    let outcome = view.load().await;

    assert_eq!(
        outcome,
        LoadOutcome::Failed(PortalError::transport("connection reset"))
    );
    assert_eq!(view.len(), 1);
    assert_eq!(view.error(), Some("transport error: connection reset"));
}

#[tokio::test]
async fn successful_load_clears_the_error() {
    let source = Scripted::queue(vec![
        Err(PortalError::application("boom")),
        Ok(vec![request(1, "pending", 0)]),
    ]);
    let mut view = view(source);

    view.load().await;
    assert_eq!(view.error(), Some("boom"));
    view.load().await;
    assert!(view.error().is_none());
}

#[tokio::test]
async fn cancellation_drops_late_data() {
    let gate = Arc::new(Notify::new());
    let source = Scripted::gated(gate.clone(), vec![Ok(vec![request(1, "pending", 0)])]);
    let mut view = view(source);
    let token = view.cancellation_token();

    let (outcome, ()) = tokio::join!(view.load(), async {
        tokio::task::yield_now().await;
        token.cancel();
        gate.notify_one();
    });

    assert_eq!(outcome, LoadOutcome::Cancelled);
    assert!(view.is_empty());
    assert_eq!(view.load().await, LoadOutcome::Cancelled);
}

#[tokio::test]
async fn abandoned_load_clears_the_loading_flag() {
    let gate = Arc::new(Notify::new());
    let source = Scripted::gated(gate.clone(), vec![Ok(vec![request(1, "pending", 0)])]);
    let mut view = view(source.clone());

    let timed_out = tokio::time::timeout(Duration::from_millis(20), view.load()).await;

    assert!(timed_out.is_err());
    assert!(!view.is_loading());

    gate.notify_one();
    assert_eq!(view.load().await, LoadOutcome::Loaded(1));
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn parent_token_tears_down_the_view() {
    let parent = tokio_util::sync::CancellationToken::new();
    let source = Scripted::queue(vec![Ok(vec![request(1, "pending", 0)])]);
    let mut view = view(source.clone()).with_cancellation(&parent);

    parent.cancel();

    assert_eq!(view.load().await, LoadOutcome::Cancelled);
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn mutation_triggers_exactly_one_reload() {
    let source = Scripted::queue(vec![
        Ok(vec![request(1, "pending", 0)]),
        Ok(vec![request(1, "in-progress", 0)]),
    ]);
    let fixed = Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap();
    let mut view = view(source.clone()).with_clock(Arc::new(FixedClock(fixed)));
    view.load().await;

    let outcome = view.update_status(1, "in-progress").await;

    assert_eq!(outcome, MutationOutcome::Applied(LoadOutcome::Loaded(1)));
    assert_eq!(source.fetches(), 2);
    assert_eq!(
        *source.statuses.lock(),
        vec![(1, "in-progress".to_owned(), fixed)]
    );
    assert_eq!(view.get(1).unwrap().status.as_str(), "in-progress");
}

#[tokio::test]
async fn rejected_mutation_does_not_reload() {
    let source = Scripted::queue(vec![Ok(vec![request(1, "pending", 0)])]);
    *source.reject_status.lock() = Some(PortalError::application("Intern not found"));
    let mut view = view(source.clone());
    view.load().await;

    let outcome = view.update_status(1, "completed").await;

    assert_eq!(
        outcome,
        MutationOutcome::Rejected(PortalError::application("Intern not found"))
    );
    assert_eq!(source.fetches(), 1);
    assert_eq!(view.error(), Some("Intern not found"));
}

#[tokio::test]
async fn unsupported_mutation_is_rejected() {
    let source = Scripted::queue(vec![Ok(vec![request(1, "pending", 0)])]);
    let mut view = view(source.clone());
    view.load().await;

    let outcome = view.update_note(1, NoteKind::Admin, "call back").await;

    assert_eq!(
        outcome,
        MutationOutcome::Rejected(PortalError::unsupported("update_note"))
    );
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn unknown_record_is_not_found() {
    let source = Scripted::queue(vec![Ok(vec![request(1, "pending", 0)])]);
    let mut view = view(source.clone());
    view.load().await;

    let outcome = view.delete(42).await;

    assert_eq!(
        outcome,
        MutationOutcome::Rejected(PortalError::not_found("record 42 is not loaded"))
    );
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn filters_narrow_rows_but_not_stats() {
    let source = Scripted::queue(vec![Ok(vec![
        request(1, "completed", 2),
        request(2, "pending", 0),
        request(3, "completed", 4),
        request(4, "on-hold", 0),
    ])]);
    let mut view = view(source);
    view.load().await;

    view.set_filter(Dimension::Status, "completed").unwrap();
    let ids: Vec<i64> = view.filtered().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let stats = view.stats();
    assert_eq!(stats.get("total_customers"), Some(4.0));
    assert_eq!(stats.get("completion_rate"), Some(50.0));

    view.clear_filters();
    assert_eq!(view.filtered().len(), 4);
    assert!(view.filter_state().is_unconstrained());
}

#[tokio::test]
async fn invalid_filter_leaves_state_unchanged() {
    let mut view = view(Scripted::queue(Vec::new()));
    view.set_filter(Dimension::PrimaryCount, "1-5").unwrap();

    let err = view.set_filter(Dimension::PrimaryCount, "lots").unwrap_err();

    assert_eq!(err, FilterError::InvalidCountBucket("lots".to_owned()));
    assert_eq!(view.filter_state().active_count(), 1);
}

#[tokio::test]
async fn date_filter_uses_the_view_clock() {
    let source = Scripted::queue(vec![Ok(vec![request(1, "pending", 0)])]);
    let fixed = Utc.with_ymd_and_hms(2025, 3, 1, 23, 0, 0).unwrap();
    let mut view = view(source).with_clock(Arc::new(FixedClock(fixed)));
    view.load().await;

    assert_eq!(view.now(), fixed);
    view.set_filter(Dimension::DateTo, "2025-03-01").unwrap();
    assert_eq!(view.filtered().len(), 1);
    view.set_filter(Dimension::DateTo, "2025-02-28").unwrap();
    assert!(view.filtered().is_empty());
}
