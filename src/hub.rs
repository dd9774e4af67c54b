//! In-process event bus and global shutdown signal.
//!
//! Every event kind gets its own bounded channel so a slow consumer pushes back on
//! its producers instead of queueing without limit. All loops also watch the single
//! stop token, and every blocking send here gives up as soon as stop fires.

pub mod protocol;

pub use protocol::{
    DrawRequest, MatchList, PagingRequest, QueryEvent, QuerySeq, ResultSet, StatusMessage,
};

use crate::error::{LinepickError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio_util::sync::CancellationToken;

/// Capacity of every hub channel.
pub const CHANNEL_CAPACITY: usize = 5;

/// A sender paired with its receiver, which is handed out once to the owning loop.
#[derive(Debug)]
struct Channel<T> {
    tx: Sender<T>,
    rx: Mutex<Option<Receiver<T>>>,
    name: &'static str,
}

impl<T> Channel<T> {
    fn new(name: &'static str) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            name,
        }
    }

    fn take_receiver(&self) -> Result<Receiver<T>> {
        self.rx
            .lock()
            .take()
            .ok_or_else(|| LinepickError::channel(format!("{} receiver already taken", self.name)))
    }
}

/// The session's event bus.
#[derive(Debug)]
pub struct Hub {
    stop: CancellationToken,
    stopped: AtomicBool,
    query_seq: AtomicU64,
    /// Text of the latest query. Held while numbering and enqueueing a query so
    /// channel order equals seq order.
    latest_text: Mutex<String>,
    queries: Channel<QueryEvent>,
    draws: Channel<DrawRequest>,
    statuses: Channel<StatusMessage>,
    paging: Channel<PagingRequest>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        Self {
            stop: CancellationToken::new(),
            stopped: AtomicBool::new(false),
            query_seq: AtomicU64::new(0),
            latest_text: Mutex::new(String::new()),
            queries: Channel::new("query"),
            draws: Channel::new("draw"),
            statuses: Channel::new("status"),
            paging: Channel::new("paging"),
        }
    }

    /// Fire the global stop signal.
    ///
    /// Returns true only for the call that actually stopped the hub; later calls are
    /// no-ops.
    pub fn stop(&self) -> bool {
        let first = !self.stopped.swap(true, Ordering::SeqCst);
        if first {
            log::debug!("hub stop requested");
            self.stop.cancel();
        }
        first
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Resolves once stop has fired.
    pub async fn stopped(&self) {
        self.stop.cancelled().await;
    }

    /// A clone of the stop token for code that must outlive a borrow of the hub.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Sequence number of the most recently enqueued query (0 before any).
    pub fn latest_query_seq(&self) -> QuerySeq {
        self.query_seq.load(Ordering::SeqCst)
    }

    /// True when `seq` is the latest query, or the latest query repeats `text`.
    pub fn is_latest_query(&self, seq: QuerySeq, text: &str) -> bool {
        let latest_text = self.latest_text.lock();
        self.query_seq.load(Ordering::SeqCst) == seq || *latest_text == text
    }

    /// Submit a query, waiting for channel space. Returns its sequence number.
    pub async fn send_query(&self, text: impl Into<String>) -> Result<QuerySeq> {
        self.ensure_running()?;
        let permit = tokio::select! {
            biased;
            _ = self.stop.cancelled() => return Err(LinepickError::Stopped),
            permit = self.queries.tx.reserve() => permit
                .map_err(|_| LinepickError::channel("query receiver dropped"))?,
        };

        let text = text.into();
        let mut latest_text = self.latest_text.lock();
        let seq = self.query_seq.fetch_add(1, Ordering::SeqCst) + 1;
        latest_text.clone_from(&text);
        permit.send(QueryEvent { seq, text });
        Ok(seq)
    }

    /// Submit a query only if there is room right now. `Ok(None)` means the channel
    /// was full and nothing was sent.
    pub fn try_send_query(&self, text: impl Into<String>) -> Result<Option<QuerySeq>> {
        self.ensure_running()?;
        let permit = match self.queries.tx.try_reserve() {
            Ok(permit) => permit,
            Err(TrySendError::Full(())) => return Ok(None),
            Err(TrySendError::Closed(())) => {
                return Err(LinepickError::channel("query receiver dropped"))
            }
        };

        let text = text.into();
        let mut latest_text = self.latest_text.lock();
        let seq = self.query_seq.fetch_add(1, Ordering::SeqCst) + 1;
        latest_text.clone_from(&text);
        permit.send(QueryEvent { seq, text });
        Ok(Some(seq))
    }

    pub async fn send_draw(&self, request: DrawRequest) -> Result<()> {
        self.send(&self.draws, request).await
    }

    /// Ask for a redraw unless one is already queued.
    pub fn request_redraw(&self) {
        let _ = self.draws.tx.try_send(DrawRequest::Redraw);
    }

    pub async fn send_status(&self, message: StatusMessage) -> Result<()> {
        self.send(&self.statuses, message).await
    }

    /// Best-effort status update for callers that must not block.
    pub fn try_send_status(&self, message: StatusMessage) -> bool {
        self.statuses.tx.try_send(message).is_ok()
    }

    pub async fn send_paging(&self, request: PagingRequest) -> Result<()> {
        self.send(&self.paging, request).await
    }

    pub fn take_query_receiver(&self) -> Result<Receiver<QueryEvent>> {
        self.queries.take_receiver()
    }

    pub fn take_draw_receiver(&self) -> Result<Receiver<DrawRequest>> {
        self.draws.take_receiver()
    }

    pub fn take_status_receiver(&self) -> Result<Receiver<StatusMessage>> {
        self.statuses.take_receiver()
    }

    pub fn take_paging_receiver(&self) -> Result<Receiver<PagingRequest>> {
        self.paging.take_receiver()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_stopped() {
            Err(LinepickError::Stopped)
        } else {
            Ok(())
        }
    }

    async fn send<T>(&self, channel: &Channel<T>, value: T) -> Result<()> {
        self.ensure_running()?;
        tokio::select! {
            biased;
            _ = self.stop.cancelled() => Err(LinepickError::Stopped),
            sent = channel.tx.send(value) => sent
                .map_err(|_| LinepickError::channel(format!("{} receiver dropped", channel.name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn stop_is_idempotent() {
        let hub = Hub::new();
        assert!(!hub.is_stopped());
        assert!(hub.stop());
        assert!(!hub.stop());
        assert!(hub.is_stopped());
    }

    #[test]
    fn receivers_are_handed_out_once() {
        let hub = Hub::new();
        assert!(hub.take_query_receiver().is_ok());
        assert!(matches!(
            hub.take_query_receiver(),
            Err(LinepickError::Channel { .. })
        ));
    }

    #[tokio::test]
    async fn queries_carry_increasing_sequence_numbers() {
        let hub = Hub::new();
        let mut rx = hub.take_query_receiver().unwrap();

        let first = hub.send_query("a").await.unwrap();
        let second = hub.send_query("ab").await.unwrap();
        assert!(second > first);
        assert_eq!(hub.latest_query_seq(), second);

        assert_eq!(rx.recv().await.unwrap().text, "a");
        let event = rx.recv().await.unwrap();
        assert_eq!(event, QueryEvent { seq: second, text: "ab".to_string() });
    }

    #[tokio::test]
    async fn repeated_text_keeps_older_queries_current() {
        let hub = Hub::new();
        let _rx = hub.take_query_receiver().unwrap();

        let first = hub.send_query("err").await.unwrap();
        let refresh = hub.send_query("err").await.unwrap();
        assert!(hub.is_latest_query(first, "err"));
        assert!(hub.is_latest_query(refresh, "err"));

        hub.send_query("error").await.unwrap();
        assert!(!hub.is_latest_query(first, "err"));
        assert!(!hub.is_latest_query(refresh, "err"));
    }

    #[tokio::test]
    async fn full_channel_applies_backpressure_until_stop() {
        let hub = Arc::new(Hub::new());
        let _rx = hub.take_query_receiver().unwrap();

        for i in 0..CHANNEL_CAPACITY {
            assert!(hub.try_send_query(format!("q{i}")).unwrap().is_some());
        }
        // Full: the non-blocking path reports it without consuming a sequence number
        let latest = hub.latest_query_seq();
        assert_eq!(hub.try_send_query("overflow").unwrap(), None);
        assert_eq!(hub.latest_query_seq(), latest);

        let blocked = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move { hub.send_query("blocked").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        hub.stop();
        let result = timeout(Duration::from_millis(200), blocked)
            .await
            .expect("blocked sender was not released")
            .unwrap();
        assert!(matches!(result, Err(LinepickError::Stopped)));
    }

    #[tokio::test]
    async fn sends_after_stop_fail_fast() {
        let hub = Hub::new();
        hub.stop();
        assert!(hub.send_draw(DrawRequest::Redraw).await.unwrap_err().is_stopped());
        assert!(hub
            .send_paging(PagingRequest::NextPage)
            .await
            .unwrap_err()
            .is_stopped());
        assert!(hub.try_send_query("late").unwrap_err().is_stopped());
    }
}
