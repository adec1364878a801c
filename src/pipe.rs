//! Unbounded pipe endpoints and the bridge task connecting them.
//!
//! A pipe is two bounded channels joined by a single coordination task (the
//! bridge) that owns a [`GrowableRing`]. Producers send into the bounded
//! input channel and consumers receive from the bounded output channel; the
//! bridge moves values between them, spilling into the ring whenever the
//! output side lags so that producers are never blocked by a slow consumer.
//!
//! ```text
//! Producer ──▶ input channel ──▶ bridge ──▶ output channel ──▶ Consumer
//!                (bounded)         │            (bounded)
//!                                  ▼
//!                            GrowableRing
//!                            (elastic, FIFO)
//! ```
//!
//! The bridge alternates between three phases:
//!
//! 1. **Direct forward**: with an empty ring, each received value is offered
//!    to the output without blocking; if the output is full the value spills
//!    into the ring instead.
//! 2. **Drain while accepting**: with a non-empty ring, the bridge races
//!    receiving one more input value (which must queue behind the backlog)
//!    against reserving an output slot for the ring's front value. Both
//!    raced futures are cancel-safe, so whichever loses the race has no
//!    effect. When the backlog empties, the ring is reset to reclaim the
//!    memory the burst consumed.
//! 3. **Drain to close**: once the input channel closes, the remaining
//!    backlog is flushed with plain awaited sends and the output channel is
//!    closed, signalling end-of-stream downstream.
//!
//! Values arrive at the consumer in exactly the order producers sent them:
//! the ring is appended to at the back and drained from the front, and the
//! direct-forward path only bypasses the ring while it is provably empty.
//!
//! Dropping every [`PipeSender`] is the sole shutdown signal. There is no
//! separate cancellation primitive; timeouts must be layered by the
//! producer closing its end.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::PipeConfig;
use crate::error::{SendError, TryRecvError, TrySendError};
use crate::ring::GrowableRing;

/// State shared between the endpoints and the bridge for observability.
///
/// `buffered` is mutated only by the bridge; the endpoints read it with an
/// atomic load. Channel occupancy is read through weak senders so neither
/// handle keeps a channel alive.
struct Shared<T> {
    /// Number of values resident in the ring. Advisory snapshot only; no
    /// ordering is guaranteed relative to in-flight sends and receives.
    buffered: AtomicUsize,
    /// Weak view of the input channel for occupancy reporting.
    input: mpsc::WeakSender<T>,
    /// Weak view of the output channel for occupancy reporting.
    output: mpsc::WeakSender<T>,
}

impl<T> Shared<T> {
    fn buffered(&self) -> usize {
        self.buffered.load(Ordering::Relaxed)
    }

    /// Total values resident in the pipe: input channel + ring + output
    /// channel. Each term is its own snapshot, so the sum is best-effort
    /// under concurrency, never transactionally exact.
    fn len(&self) -> usize {
        channel_occupancy(&self.input) + self.buffered() + channel_occupancy(&self.output)
    }
}

/// Occupancy of a bounded channel observed through a weak sender.
///
/// Reads zero once the channel's senders are gone (shutdown already
/// propagating), which keeps the report consistent with the advisory
/// snapshot contract.
fn channel_occupancy<T>(weak: &mpsc::WeakSender<T>) -> usize {
    weak.upgrade()
        .map_or(0, |tx| tx.max_capacity() - tx.capacity())
}

/// Creates an unbounded pipe with the given bounded endpoint capacities.
///
/// Returns the producer and consumer endpoints. The bridge task is spawned
/// on the ambient tokio runtime, so this must be called within one.
///
/// # Panics
///
/// Panics if either capacity is zero.
#[must_use]
pub fn pipe<T: Send + 'static>(
    input_capacity: usize,
    output_capacity: usize,
) -> (PipeSender<T>, PipeReceiver<T>) {
    pipe_with_config(PipeConfig::new(input_capacity, output_capacity))
}

/// Creates an unbounded pipe from a full [`PipeConfig`].
///
/// # Panics
///
/// Panics if any configured capacity is zero.
#[must_use]
pub fn pipe_with_config<T: Send + 'static>(config: PipeConfig) -> (PipeSender<T>, PipeReceiver<T>) {
    assert!(config.input_capacity > 0, "input capacity must be > 0");
    assert!(config.output_capacity > 0, "output capacity must be > 0");
    assert!(config.cell_capacity > 0, "cell capacity must be > 0");

    let (input_tx, input_rx) = mpsc::channel(config.input_capacity);
    let (output_tx, output_rx) = mpsc::channel(config.output_capacity);

    let shared = Arc::new(Shared {
        buffered: AtomicUsize::new(0),
        input: input_tx.downgrade(),
        output: output_tx.downgrade(),
    });

    let ring = GrowableRing::with_cell_capacity(config.cell_capacity);
    tokio::spawn(bridge(input_rx, output_tx, ring, Arc::clone(&shared)));

    (
        PipeSender {
            tx: input_tx,
            shared: Arc::clone(&shared),
        },
        PipeReceiver {
            rx: output_rx,
            shared,
        },
    )
}

/// The single coordination task. Sole owner of the ring; the only writer of
/// the shared live-count.
async fn bridge<T>(
    mut input: mpsc::Receiver<T>,
    output: mpsc::Sender<T>,
    mut ring: GrowableRing<T>,
    shared: Arc<Shared<T>>,
) {
    'accept: loop {
        let Some(value) = input.recv().await else {
            break 'accept;
        };

        if ring.is_empty() {
            // Fast path: no backlog, offer straight to the output.
            match output.try_send(value) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(value)) => {
                    trace!("output full, spilling to ring");
                    ring.write(value);
                    shared.buffered.fetch_add(1, Ordering::Relaxed);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("receiver dropped, stopping bridge");
                    shared.buffered.store(0, Ordering::Relaxed);
                    return;
                }
            }
        } else {
            // Backlog exists; new data must queue behind it to keep FIFO.
            ring.write(value);
            shared.buffered.fetch_add(1, Ordering::Relaxed);
        }

        // Drain the backlog without ever blocking on a full output, which
        // would also stall intake. Race accepting one more value against
        // securing one output slot; both futures are cancel-safe.
        while !ring.is_empty() {
            tokio::select! {
                received = input.recv() => match received {
                    Some(value) => {
                        ring.write(value);
                        shared.buffered.fetch_add(1, Ordering::Relaxed);
                    }
                    None => break 'accept,
                },
                permit = output.reserve() => match permit {
                    Ok(permit) => {
                        permit.send(ring.pop());
                        shared.buffered.fetch_sub(1, Ordering::Relaxed);
                        if ring.is_empty() {
                            debug!(reclaimed = ring.capacity(), "backlog drained, resetting ring");
                            ring.reset();
                            shared.buffered.store(0, Ordering::Relaxed);
                        }
                    }
                    Err(_) => {
                        debug!("receiver dropped, stopping bridge");
                        shared.buffered.store(0, Ordering::Relaxed);
                        return;
                    }
                },
            }
        }
    }

    // Input closed: no further intake competes for attention, so blocking
    // sends are acceptable here. Flush the backlog, then drop the output
    // sender to signal end-of-stream.
    if !ring.is_empty() {
        debug!(backlog = shared.buffered(), "input closed, flushing backlog");
    }
    while !ring.is_empty() {
        if output.send(ring.pop()).await.is_err() {
            debug!("receiver dropped during final drain");
            break;
        }
        shared.buffered.fetch_sub(1, Ordering::Relaxed);
    }
    if ring.is_empty() {
        ring.reset();
    }
    shared.buffered.store(0, Ordering::Relaxed);
}

/// Producer endpoint of an unbounded pipe.
///
/// Cloneable for multiple producers. Sending suspends only while the
/// bounded input channel is full; the bridge drains it continuously, so the
/// pipe as a whole never exerts backpressure beyond that window. Dropping
/// every sender closes the pipe: buffered values still reach the consumer,
/// after which the receive side reports end-of-stream.
pub struct PipeSender<T> {
    tx: mpsc::Sender<T>,
    shared: Arc<Shared<T>>,
}

impl<T> PipeSender<T> {
    /// Sends a value, suspending while the input channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] with the value if the pipe has shut down
    /// (receiver dropped).
    pub async fn send(&self, value: T) -> Result<(), SendError<T>> {
        self.tx.send(value).await.map_err(|e| SendError(e.0))
    }

    /// Attempts to send a value without suspending.
    ///
    /// # Errors
    ///
    /// Returns [`TrySendError::Full`] if the input channel has no space and
    /// [`TrySendError::Closed`] if the pipe has shut down, in both cases
    /// handing the value back.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.tx.try_send(value).map_err(|e| match e {
            mpsc::error::TrySendError::Full(value) => TrySendError::Full(value),
            mpsc::error::TrySendError::Closed(value) => TrySendError::Closed(value),
        })
    }

    /// Returns `true` if the pipe has shut down and sends will fail.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Total values resident in the pipe (input channel, ring, and output
    /// channel). Best-effort snapshot under concurrency.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if [`len`](Self::len) observes no resident values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values currently resident in the elastic ring alone. Atomic snapshot
    /// of the live-count.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.shared.buffered()
    }
}

impl<T> Clone for PipeSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for PipeSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeSender")
            .field("len", &self.len())
            .field("buffered", &self.buffered())
            .field("is_closed", &self.is_closed())
            .finish()
    }
}

/// Consumer endpoint of an unbounded pipe.
///
/// Receiving suspends while the output channel is empty and returns `None`
/// once the pipe is closed and fully drained.
pub struct PipeReceiver<T> {
    rx: mpsc::Receiver<T>,
    shared: Arc<Shared<T>>,
}

impl<T> PipeReceiver<T> {
    /// Receives the next value, suspending until one is available.
    ///
    /// Returns `None` after every sender has been dropped and all buffered
    /// values have been delivered.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Attempts to receive a value without suspending.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] if no value is ready and
    /// [`TryRecvError::Disconnected`] once the pipe is closed and drained.
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        self.rx.try_recv().map_err(|e| match e {
            mpsc::error::TryRecvError::Empty => TryRecvError::Empty,
            mpsc::error::TryRecvError::Disconnected => TryRecvError::Disconnected,
        })
    }

    /// Total values resident in the pipe (input channel, ring, and output
    /// channel). Best-effort snapshot under concurrency.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if [`len`](Self::len) observes no resident values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values currently resident in the elastic ring alone. Atomic snapshot
    /// of the live-count.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.shared.buffered()
    }
}

impl<T> fmt::Debug for PipeReceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeReceiver")
            .field("len", &self.len())
            .field("buffered", &self.buffered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Polls `cond` until it holds or the timeout elapses.
    async fn wait_for(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_fifo_through_backlog() {
        let (tx, mut rx) = pipe_with_config::<usize>(PipeConfig::new(4, 4).cell_capacity(8));

        // Nothing is consumed while sending, so the output fills and the
        // bridge spills into the ring, growing it past its initial cells.
        for i in 0..200 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        for i in 0..200 {
            assert_eq!(rx.recv().await, Some(i));
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_concurrent_sum() {
        let (tx, mut rx) = pipe::<u64>(10, 10);

        let producer = tokio::spawn(async move {
            for i in 1..=1000 {
                tx.send(i).await.unwrap();
            }
        });

        let mut sum = 0;
        let mut previous = 0;
        while let Some(value) = rx.recv().await {
            assert_eq!(value, previous + 1, "values reordered or dropped");
            previous = value;
            sum += value;
        }

        producer.await.unwrap();
        assert_eq!(sum, 500_500);
    }

    #[tokio::test]
    async fn test_backlog_distribution() {
        let (tx, mut rx) = pipe_with_config::<u32>(PipeConfig::new(10, 50).cell_capacity(64));

        for i in 1..=199 {
            tx.send(i).await.unwrap();
        }

        // The bridge stabilizes with the output full (50), the input empty,
        // and the remaining 149 values in the ring.
        wait_for(|| tx.buffered() == 149).await;
        assert_eq!(tx.len(), 199);
        assert_eq!(rx.buffered(), 149);

        drop(tx);
        for i in 1..=199 {
            assert_eq!(rx.recv().await, Some(i));
        }
        assert_eq!(rx.recv().await, None);
        assert_eq!(rx.buffered(), 0);
    }

    #[tokio::test]
    async fn test_fast_path_skips_ring() {
        let (tx, mut rx) = pipe::<u8>(4, 4);

        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        // The output always had room, so nothing ever touched the ring.
        assert_eq!(rx.buffered(), 0);
    }

    #[tokio::test]
    async fn test_close_drains_backlog() {
        let (tx, mut rx) = pipe::<usize>(1, 1);

        for i in 0..50 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        for i in 0..50 {
            assert_eq!(rx.recv().await, Some(i));
        }
        assert_eq!(rx.recv().await, None);
        assert_eq!(rx.len(), 0);
        assert_eq!(rx.buffered(), 0);
    }

    #[tokio::test]
    async fn test_try_recv() {
        let (tx, mut rx) = pipe::<u8>(2, 2);

        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        tx.send(9).await.unwrap();
        wait_for(|| rx.len() > 0).await;
        loop {
            match rx.try_recv() {
                Ok(value) => {
                    assert_eq!(value, 9);
                    break;
                }
                Err(TryRecvError::Empty) => tokio::task::yield_now().await,
                Err(TryRecvError::Disconnected) => panic!("pipe closed early"),
            }
        }

        drop(tx);
        wait_for(|| matches!(rx.try_recv(), Err(TryRecvError::Disconnected))).await;
    }

    #[tokio::test]
    async fn test_receiver_drop_closes_pipe() {
        let (tx, rx) = pipe::<u8>(2, 2);
        drop(rx);

        // The bridge notices the closed output when it next forwards.
        tx.send(1).await.unwrap();
        wait_for(|| tx.is_closed()).await;

        let err = tx.send(2).await.unwrap_err();
        assert_eq!(err.into_inner(), 2);
        assert_eq!(tx.buffered(), 0);
    }

    #[tokio::test]
    async fn test_cloned_senders_share_pipe() {
        let (tx, mut rx) = pipe::<u64>(4, 4);
        let tx2 = tx.clone();

        let a = tokio::spawn(async move {
            for i in 0..500 {
                tx.send(i).await.unwrap();
            }
        });
        let b = tokio::spawn(async move {
            for i in 0..500 {
                tx2.send(i).await.unwrap();
            }
        });

        let mut count = 0;
        while let Some(_value) = rx.recv().await {
            count += 1;
        }

        a.await.unwrap();
        b.await.unwrap();
        assert_eq!(count, 1000);
    }

    #[tokio::test]
    async fn test_debug_formatting() {
        let (tx, rx) = pipe::<u8>(2, 2);
        assert!(format!("{tx:?}").contains("PipeSender"));
        assert!(format!("{rx:?}").contains("PipeReceiver"));
    }
}
