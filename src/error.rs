//! Error types for ring and pipe operations.
//!
//! [`EmptyError`] is the only recoverable error in the core: it signals "no
//! data currently available" from [`GrowableRing::read`]. Contract
//! violations (peeking or popping an empty ring, resetting a non-empty one)
//! are programmer errors and panic instead of returning an error.
//!
//! [`GrowableRing::read`]: crate::ring::GrowableRing::read

use std::fmt;

/// The ring buffer contains no data.
///
/// Returned by [`GrowableRing::read`](crate::ring::GrowableRing::read).
/// Callers that have already established non-emptiness can use
/// [`pop`](crate::ring::GrowableRing::pop) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ring buffer is empty")]
pub struct EmptyError;

/// The pipe has shut down and the value could not be sent.
///
/// Returned by [`PipeSender::send`](crate::pipe::PipeSender::send) once the
/// receiver has been dropped. Carries the unsent value.
#[derive(Debug, PartialEq, Eq)]
pub struct SendError<T>(
    /// The value that could not be sent.
    pub T,
);

impl<T> SendError<T> {
    /// Consumes the error and returns the value that could not be sent.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sending on a closed pipe")
    }
}

impl<T: fmt::Debug> std::error::Error for SendError<T> {}

/// Error returned from a non-blocking send.
#[derive(Debug, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The input channel is full; the value is returned to the caller.
    Full(T),

    /// The pipe has shut down; the value is returned to the caller.
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Returns `true` if the send failed because the input channel is full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Returns `true` if the send failed because the pipe has shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    /// Consumes the error and returns the value that could not be sent.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "pipe input channel is full"),
            Self::Closed(_) => write!(f, "sending on a closed pipe"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for TrySendError<T> {}

/// Error returned from a non-blocking receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    /// No value is currently available.
    #[error("pipe output channel is empty")]
    Empty,

    /// The pipe is closed and fully drained.
    #[error("pipe is closed and drained")]
    Disconnected,
}
