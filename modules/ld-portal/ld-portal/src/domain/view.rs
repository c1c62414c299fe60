//! One dashboard collection: remote records, filter state and derived KPIs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ld_portal_sdk::{NoteKind, PortalError};
use ldp_query::{
    Dimension, FieldMap, FilterEngine, FilterError, FilterState, Filterable, MetricSpec, Stats,
    StatsAggregator,
};
use tokio_util::sync::CancellationToken;

use super::sources::{RecordId, RecordSource};

/// Source of "now" for expiry-sensitive filters and metrics.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced; carries the new record count.
    Loaded(usize),
    /// The previous collection was kept and the error recorded.
    Failed(PortalError),
    /// The view was torn down; any late response was dropped.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the change and the view reloaded.
    Applied(LoadOutcome),
    /// Nothing changed; the error was recorded.
    Rejected(PortalError),
}

type SharedSource<R> = Arc<dyn RecordSource<Record = R>>;

/// Holds the loading flag up while a fetch is in flight. Lowered on drop,
/// so an abandoned `load` future still clears it.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Owns one remote collection for one view.
///
/// Filtering and statistics are recomputed on every read. Every successful
/// mutation is followed by a full reload, so the collection always mirrors
/// the backend rather than a local patch of it.
pub struct RecordCollectionView<R>
where
    R: Filterable + RecordId + Send + Sync + 'static,
{
    source: SharedSource<R>,
    engine: FilterEngine<R::Field>,
    aggregator: StatsAggregator<R>,
    clock: Arc<dyn Clock>,
    records: Vec<R>,
    filter: FilterState,
    loading: bool,
    error: Option<String>,
    cancel: CancellationToken,
}

impl<R> RecordCollectionView<R>
where
    R: Filterable + RecordId + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(
        source: SharedSource<R>,
        field_map: FieldMap<R::Field>,
        metrics: Vec<MetricSpec<R>>,
    ) -> Self {
        Self {
            source,
            engine: FilterEngine::new(field_map),
            aggregator: StatsAggregator::new(metrics),
            clock: Arc::new(SystemClock),
            records: Vec::new(),
            filter: FilterState::default(),
            loading: false,
            error: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Tie the view's lifetime to a parent token.
    #[must_use]
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Fetch the collection and replace the local copy wholesale.
    pub async fn load(&mut self) -> LoadOutcome {
        if self.cancel.is_cancelled() {
            return LoadOutcome::Cancelled;
        }
        let source = Arc::clone(&self.source);
        let cancel = self.cancel.clone();
        let guard = LoadingGuard::raise(&mut self.loading);
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = source.fetch() => Some(result),
        };
        drop(guard);

        match fetched {
            _ if self.cancel.is_cancelled() => {
                tracing::debug!(source = source.name(), "view torn down, dropping response");
                LoadOutcome::Cancelled
            }
            None => LoadOutcome::Cancelled,
            Some(Ok(records)) => {
                tracing::debug!(source = source.name(), count = records.len(), "collection loaded");
                self.records = records;
                self.error = None;
                LoadOutcome::Loaded(self.records.len())
            }
            Some(Err(e)) => {
                tracing::warn!(source = source.name(), error = %e, "collection load failed");
                self.error = Some(e.to_string());
                LoadOutcome::Failed(e)
            }
        }
    }

    /// # Errors
    /// Returns `FilterError` when `value` does not parse for `dimension`; the
    /// filter state is left unchanged.
    pub fn set_filter(&mut self, dimension: Dimension, value: &str) -> Result<(), FilterError> {
        self.filter.set(dimension, value)
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    #[must_use]
    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Records passing the current filters, in collection order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&R> {
        self.engine
            .apply(&self.records, &self.filter, self.clock.now())
    }

    /// Metrics over the whole collection, ignoring filters.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.aggregator.aggregate(&self.records, self.clock.now())
    }

    pub async fn update_status(&mut self, id: i64, status: &str) -> MutationOutcome {
        let now = self.clock.now();
        let result = match self.find(id) {
            Ok(record) => self.source.update_status(record, status, now).await,
            Err(e) => Err(e),
        };
        self.settle("update_status", id, result).await
    }

    /// `None` unassigns.
    pub async fn assign_intern(&mut self, id: i64, intern_id: Option<i64>) -> MutationOutcome {
        let result = match self.find(id) {
            Ok(record) => self.source.assign_intern(record, intern_id).await,
            Err(e) => Err(e),
        };
        self.settle("assign_intern", id, result).await
    }

    pub async fn update_note(&mut self, id: i64, kind: NoteKind, text: &str) -> MutationOutcome {
        let result = match self.find(id) {
            Ok(record) => self.source.update_note(record, kind, text).await,
            Err(e) => Err(e),
        };
        self.settle("update_note", id, result).await
    }

    pub async fn delete(&mut self, id: i64) -> MutationOutcome {
        let result = match self.find(id) {
            Ok(record) => self.source.delete(record).await,
            Err(e) => Err(e),
        };
        self.settle("delete", id, result).await
    }

    fn find(&self, id: i64) -> Result<&R, PortalError> {
        self.get(id)
            .ok_or_else(|| PortalError::not_found(format!("record {id} is not loaded")))
    }

    async fn settle(
        &mut self,
        operation: &'static str,
        id: i64,
        result: Result<(), PortalError>,
    ) -> MutationOutcome {
        match result {
            Ok(()) => {
                tracing::debug!(source = self.source.name(), operation, id, "mutation applied");
                MutationOutcome::Applied(self.load().await)
            }
            Err(e) => {
                tracing::warn!(source = self.source.name(), operation, id, error = %e, "mutation rejected");
                self.error = Some(e.to_string());
                MutationOutcome::Rejected(e)
            }
        }
    }

    /// Tear the view down; loads in flight resolve as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&R> {
        self.records.iter().find(|r| r.record_id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Message of the last failed load or mutation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
