//! # Plenum
//!
//! An unbounded-capacity FIFO pipe built from two fixed-capacity bounded
//! channels and an elastic buffer bridging them. Producers never block on a
//! full buffer; consumers see values in strict arrival order.
//!
//! ```text
//! Producer ──▶ input channel ──▶ bridge ──▶ output channel ──▶ Consumer
//!                (bounded)         │            (bounded)
//!                                  ▼
//!                            GrowableRing
//!                            (elastic, FIFO)
//! ```
//!
//! The elastic buffer is a [`GrowableRing`]: a cycle of fixed-size cells
//! that grows one cell at a time when saturated and collapses back to its
//! initial size once a backlog fully drains, so a transient burst does not
//! pin memory forever. A single bridge task owns the ring exclusively and
//! shuttles values between the channels, keeping the pipe deadlock-free and
//! globally FIFO under arbitrary producer and consumer speeds.
//!
//! ## Quick start
//!
//! ```
//! use plenum::pipe;
//!
//! tokio_test::block_on(async {
//!     let (tx, mut rx) = pipe::<u64>(10, 10);
//!
//!     tokio::spawn(async move {
//!         for i in 1..=100 {
//!             tx.send(i).await.unwrap();
//!         }
//!         // Dropping the sender closes the pipe once the backlog drains.
//!     });
//!
//!     let mut sum = 0;
//!     while let Some(value) = rx.recv().await {
//!         sum += value;
//!     }
//!     assert_eq!(sum, 5050);
//! });
//! ```
//!
//! ## Module structure
//!
//! - [`config`]: capacity tunables and [`PipeConfig`]
//! - [`error`]: error types for ring and pipe operations
//! - [`ring`]: the growable segment ring ([`GrowableRing`])
//! - [`pipe`](crate::pipe): endpoints and the bridge task
//!
//! ## Guarantees and limits
//!
//! - Global FIFO end to end, for every value that enters the pipe.
//! - Sends suspend only while the bounded input channel is full; the bridge
//!   drains it continuously.
//! - Total memory is unbounded by design: the ring grows as far as the
//!   backlog demands. [`len`](pipe::PipeSender::len) and
//!   [`buffered`](pipe::PipeSender::buffered) are advisory snapshots for
//!   observing that growth, not synchronization points.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod pipe;
pub mod ring;

pub use config::{
    PipeConfig, DEFAULT_CELL_CAPACITY, DEFAULT_CHANNEL_CAPACITY, INITIAL_CELL_COUNT,
};
pub use error::{EmptyError, SendError, TryRecvError, TrySendError};
pub use pipe::{pipe, pipe_with_config, PipeReceiver, PipeSender};
pub use ring::GrowableRing;
