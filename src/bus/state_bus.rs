//! Replaying broadcast bus of store results.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures_util::stream;
use tokio::sync::Notify;
use tokio::sync::broadcast::{self, Receiver, Sender};
use tokio::time::timeout;

use crate::result::StoreResult;

/// Broadcast bus for [`StoreResult`] snapshots.
///
/// Two guarantees beyond a plain broadcast channel:
///
/// - **Replay**: every new subscriber receives the latest known result
///   immediately upon subscribing, even if it was computed before the
///   subscriber attached. A transient detach/reattach cycle never loses the
///   current snapshot.
/// - **News carry**: while zero subscribers are attached, news from each
///   published result is appended, in production order, to a carried-forward
///   result. The first subscriber to attach receives one result holding the
///   concatenated news, and the carry buffer is emptied at that point.
///
/// Publishing never blocks the engine loop; a subscriber that falls behind
/// the buffer capacity observes a lag, which the bus counts in
/// [`dropped`](Self::dropped).
#[derive(Debug)]
pub struct StateBus<S, N> {
    sender: Sender<StoreResult<S, N>>,
    latest: Mutex<StoreResult<S, N>>,
    attach_notify: Notify,
    dropped_results: AtomicUsize,
    capacity: usize,
}

impl<S, N> StateBus<S, N>
where
    S: Clone,
    N: Clone,
{
    pub fn new(initial: S, capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Arc::new(Self {
            sender,
            latest: Mutex::new(StoreResult::initial(initial)),
            attach_notify: Notify::new(),
            dropped_results: AtomicUsize::new(0),
            capacity,
        })
    }

    /// Broadcast a result, or fold it into the carried result when nobody is
    /// attached.
    pub fn publish(&self, result: StoreResult<S, N>) {
        let mut latest = self.latest.lock().expect("state bus poisoned");
        if self.sender.receiver_count() > 0 {
            match self.sender.send(result.clone()) {
                Ok(_) => {
                    // News is one-shot: once it sits in subscriber queues the
                    // carried result keeps only the state.
                    *latest = StoreResult::initial(result.state);
                }
                Err(broadcast::error::SendError(result)) => Self::carry(&mut latest, result),
            }
        } else {
            Self::carry(&mut latest, result);
        }
    }

    fn carry(latest: &mut StoreResult<S, N>, result: StoreResult<S, N>) {
        latest.state = result.state;
        latest.news.extend(result.news);
    }

    /// Attach a subscriber.
    ///
    /// The returned stream yields the latest known result first (draining
    /// any carried news), then live broadcasts.
    pub fn subscribe(self: &Arc<Self>) -> ResultStream<S, N> {
        let mut latest = self.latest.lock().expect("state bus poisoned");
        let receiver = self.sender.subscribe();
        let replay = latest.clone();
        latest.news.clear();
        drop(latest);
        self.attach_notify.notify_one();
        ResultStream {
            replay: Some(replay),
            receiver,
            // Weak so a lingering subscriber does not keep the bus (and its
            // sender) alive after the store is gone.
            bus: Arc::downgrade(self),
        }
    }

    /// Resolve once at least one subscriber has attached.
    pub async fn attached(&self) {
        if self.sender.receiver_count() > 0 {
            return;
        }
        self.attach_notify.notified().await;
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Results skipped by lagging subscribers since the bus was created.
    pub fn dropped(&self) -> usize {
        self.dropped_results.load(Ordering::Relaxed)
    }
}

/// Subscriber handle yielding results in broadcast order.
#[derive(Debug)]
pub struct ResultStream<S, N> {
    replay: Option<StoreResult<S, N>>,
    receiver: Receiver<StoreResult<S, N>>,
    bus: Weak<StateBus<S, N>>,
}

impl<S, N> ResultStream<S, N>
where
    S: Clone,
    N: Clone,
{
    /// Receive the next result; `None` once every handle to the store has
    /// been dropped and pending results have been drained.
    ///
    /// Lagged gaps are counted on the bus and skipped.
    pub async fn recv(&mut self) -> Option<StoreResult<S, N>> {
        if let Some(replayed) = self.replay.take() {
            return Some(replayed);
        }
        loop {
            match self.receiver.recv().await {
                Ok(result) => return Some(result),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    if let Some(bus) = self.bus.upgrade() {
                        bus.dropped_results
                            .fetch_add(missed as usize, Ordering::Relaxed);
                    }
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive with a deadline; `None` on timeout or a closed bus.
    pub async fn next_timeout(&mut self, duration: Duration) -> Option<StoreResult<S, N>> {
        match timeout(duration, self.recv()).await {
            Ok(result) => result,
            Err(_) => None,
        }
    }
}

impl<S, N> ResultStream<S, N>
where
    S: Clone + Send + 'static,
    N: Clone + Send + 'static,
{
    /// Adapt into a `futures` stream for combinator-style consumption.
    pub fn into_stream(self) -> impl futures_util::stream::Stream<Item = StoreResult<S, N>> {
        stream::unfold(self, |mut results| async move {
            results.recv().await.map(|result| (result, results))
        })
    }
}
