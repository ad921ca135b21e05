//! Periodic entity counter.
//!
//! Every interval the worker counts chats and messages, logs the totals and
//! publishes them on a `watch` channel. A failed count is logged and the
//! worker waits for the next tick.

use std::time::Duration;

use chrono::Utc;
use parley_types::config::DEFAULT_METRICS_INTERVAL_SECS;
use parley_types::error::RepositoryError;
use parley_types::metrics::MetricsSnapshot;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::BackgroundTask;
use crate::repository::chat::ChatRepository;
use crate::repository::message::MessageRepository;

/// Count chats and messages once.
pub async fn collect_snapshot<C, M>(
    chat_repo: &C,
    message_repo: &M,
) -> Result<MetricsSnapshot, RepositoryError>
where
    C: ChatRepository,
    M: MessageRepository,
{
    let chats_total = chat_repo.count_chats().await?;
    let messages_total = message_repo.count_messages().await?;
    Ok(MetricsSnapshot {
        chats_total,
        messages_total,
        collected_at: Utc::now(),
    })
}

/// Background task publishing [`MetricsSnapshot`]s.
pub struct MetricsWorker<C, M> {
    chat_repo: C,
    message_repo: M,
    interval: Duration,
    publisher: watch::Sender<Option<MetricsSnapshot>>,
}

impl<C, M> MetricsWorker<C, M>
where
    C: ChatRepository + 'static,
    M: MessageRepository + 'static,
{
    /// The first collection happens one full `interval` after start.
    /// A zero interval falls back to the default period.
    pub fn new(chat_repo: C, message_repo: M, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(DEFAULT_METRICS_INTERVAL_SECS)
        } else {
            interval
        };
        let (publisher, _) = watch::channel(None);
        Self {
            chat_repo,
            message_repo,
            interval,
            publisher,
        }
    }

    /// Receiver for the latest snapshot; `None` until the first success.
    pub fn subscribe(&self) -> watch::Receiver<Option<MetricsSnapshot>> {
        self.publisher.subscribe()
    }

    async fn collect(&self) {
        match collect_snapshot(&self.chat_repo, &self.message_repo).await {
            Ok(snapshot) => {
                info!(
                    chats_total = snapshot.chats_total,
                    messages_total = snapshot.messages_total,
                    "entity metrics"
                );
                self.publisher.send_replace(Some(snapshot));
            }
            Err(e) => warn!(error = %e, "failed to collect entity metrics"),
        }
    }
}

impl<C, M> BackgroundTask for MetricsWorker<C, M>
where
    C: ChatRepository + 'static,
    M: MessageRepository + 'static,
{
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(interval_secs = self.interval.as_secs(), "metrics worker started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("metrics worker stopping");
                    return;
                }
                _ = ticker.tick() => self.collect().await,
            }
        }
    }
}
