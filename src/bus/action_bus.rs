//! Bounded multi-producer bus of action batches.

use crate::errors::PublishError;

/// Publishing half of the action bus.
///
/// A bounded flume channel of action batches. External callers go through
/// [`publish`](Self::publish), which never awaits a consumer: it enqueues
/// into the configured buffer and fails fast with [`PublishError::Full`]
/// when the buffer is saturated (logged as a warning — the documented
/// overflow policy, chosen over silently blocking the caller). Internal
/// producers — side effects, sources, recovery streams — use a cloned
/// [`feed`](Self::feed) sender with `send_async`, which may suspend until
/// buffer space frees up.
///
/// Exactly one consumer exists: the engine loop holds the receiving half and
/// drains batches in FIFO publish order across all producers. Ordering
/// between elements of two concurrently published batches is not defined.
pub struct ActionBus<A> {
    tx: flume::Sender<Vec<A>>,
    capacity: usize,
}

impl<A> ActionBus<A> {
    /// Create a bus with the given buffer capacity (minimum 1) and return it
    /// together with the sole consumer receiver.
    pub fn bounded(capacity: usize) -> (Self, flume::Receiver<Vec<A>>) {
        let capacity = capacity.max(1);
        let (tx, rx) = flume::bounded(capacity);
        (Self { tx, capacity }, rx)
    }

    /// Enqueue a batch without awaiting the consumer.
    pub fn publish(&self, batch: Vec<A>) -> Result<(), PublishError> {
        match self.tx.try_send(batch) {
            Ok(()) => Ok(()),
            Err(flume::TrySendError::Full(_)) => {
                tracing::warn!(
                    capacity = self.capacity,
                    "action buffer full; dropping published batch"
                );
                Err(PublishError::Full {
                    capacity: self.capacity,
                })
            }
            Err(flume::TrySendError::Disconnected(_)) => Err(PublishError::Disposed),
        }
    }

    /// Clone of the sending half for internal republish paths.
    pub fn feed(&self) -> flume::Sender<Vec<A>> {
        self.tx.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
