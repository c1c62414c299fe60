//! Background polling of the notification bell.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ld_portal_sdk::{Notification, NotificationQuery, PortalClientV1, PortalError, RecipientType};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::NotificationConfig;

/// Latest notifications and the unread counter, as last published.
#[derive(Debug, Clone, Default)]
pub struct NotificationSnapshot {
    pub items: Vec<Notification>,
    pub unread: u32,
}

/// Polls one recipient's notifications and publishes snapshots.
///
/// The poller fetches immediately, then once per `poll_interval`, until its
/// token is cancelled. A failed poll is logged and the previous snapshot
/// stays published.
#[derive(Clone)]
pub struct NotificationPoller {
    client: Arc<dyn PortalClientV1>,
    query: NotificationQuery,
    interval: Duration,
    tx: Arc<watch::Sender<NotificationSnapshot>>,
    cancel: CancellationToken,
}

impl fmt::Debug for NotificationPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationPoller")
            .field("query", &self.query)
            .field("interval", &self.interval)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl NotificationPoller {
    #[must_use]
    pub fn new(
        client: Arc<dyn PortalClientV1>,
        recipient: RecipientType,
        recipient_id: Option<String>,
        config: &NotificationConfig,
    ) -> Self {
        let (tx, _) = watch::channel(NotificationSnapshot::default());
        Self {
            client,
            query: NotificationQuery::new(recipient, recipient_id, config.limit),
            interval: config.poll_interval,
            tx: Arc::new(tx),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop together with `parent`.
    #[must_use]
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NotificationSnapshot> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> NotificationSnapshot {
        self.tx.borrow().clone()
    }

    /// Run the polling loop on the current runtime.
    #[must_use]
    pub fn spawn(&self) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move { poller.run().await })
    }

    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = self.refresh() => result,
            };
            if let Err(e) = result {
                tracing::warn!(
                    recipient = self.query.recipient.as_str(),
                    error = %e,
                    "notification poll failed"
                );
            }
        }

        tracing::debug!(
            recipient = self.query.recipient.as_str(),
            "notification poller stopped"
        );
    }

    /// Fetch once and publish the result.
    ///
    /// # Errors
    /// Returns the first failing backend call; nothing is published then.
    pub async fn refresh(&self) -> Result<(), PortalError> {
        let recipient_id = self.query.recipient_id.as_deref();
        let (items, unread) = tokio::try_join!(
            self.client.notifications(&self.query),
            self.client.unread_count(self.query.recipient, recipient_id),
        )?;

        tracing::debug!(count = items.len(), unread, "notifications refreshed");
        self.tx.send_replace(NotificationSnapshot { items, unread });
        Ok(())
    }

    /// Items already shown as read leave the counter alone.
    ///
    /// # Errors
    /// Returns the backend error; the snapshot is left untouched.
    pub async fn mark_read(&self, id: i64) -> Result<(), PortalError> {
        self.client.mark_notification_read(id).await?;
        self.tx.send_modify(|snapshot| {
            let was_unread = match snapshot.items.iter_mut().find(|n| n.id == id) {
                Some(item) => !std::mem::replace(&mut item.read_status, true),
                None => true,
            };
            if was_unread {
                snapshot.unread = snapshot.unread.saturating_sub(1);
            }
        });
        Ok(())
    }

    /// Drops the item; the counter only moves if it was unread.
    ///
    /// # Errors
    /// Returns the backend error; the snapshot is left untouched.
    pub async fn delete(&self, id: i64) -> Result<(), PortalError> {
        self.client.delete_notification(id).await?;
        self.tx.send_modify(|snapshot| {
            let Some(pos) = snapshot.items.iter().position(|n| n.id == id) else {
                return;
            };
            let removed = snapshot.items.remove(pos);
            if !removed.read_status {
                snapshot.unread = snapshot.unread.saturating_sub(1);
            }
        });
        Ok(())
    }

    /// # Errors
    /// Returns the backend error; the snapshot is left untouched.
    pub async fn mark_all_read(&self) -> Result<(), PortalError> {
        self.client
            .mark_all_notifications_read(self.query.recipient, self.query.recipient_id.as_deref())
            .await?;
        self.tx.send_modify(|snapshot| {
            snapshot.unread = 0;
            for item in &mut snapshot.items {
                item.read_status = true;
            }
        });
        Ok(())
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
