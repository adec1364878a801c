//! Elastic FIFO ring buffer built from fixed-capacity cells.
//!
//! [`GrowableRing`] is an unbounded FIFO queue backed by a cycle of
//! fixed-size segments ("cells"). Writes never fail: when every cell is
//! full, one new cell is spliced into the cycle immediately before the
//! write position, so growth is O(1) and never reorders pending data.
//! Once a backlog has fully drained, [`reset`](GrowableRing::reset)
//! collapses the ring back to its initial two cells, reclaiming the memory
//! a transient burst left behind.
//!
//! ## Design
//!
//! - Cells live in an arena (`Vec<Cell<T>>`); `next`/`prev` are arena
//!   indices rather than pointers, so the cycle carries no aliasing.
//! - Single-owner: the ring is a plain mutable structure with no interior
//!   synchronization. The pipe's bridge task owns one exclusively.
//! - Slots are `Option<T>`: a read moves the value out and leaves the slot
//!   empty for the next lap.

use std::fmt;

use crate::config::{DEFAULT_CELL_CAPACITY, INITIAL_CELL_COUNT};
use crate::error::EmptyError;

/// One fixed-capacity segment of the ring.
struct Cell<T> {
    /// Slot storage; a slot is `Some` iff it holds a written, unread value.
    slots: Box<[Option<T>]>,
    /// Set when the cell has been completely written and not yet drained.
    full: bool,
    /// Next slot to read, `0..=capacity`.
    read: usize,
    /// Next slot to write, `0..=capacity`.
    write: usize,
    /// Arena index of the next cell in the cycle.
    next: usize,
    /// Arena index of the previous cell in the cycle.
    prev: usize,
}

impl<T> Cell<T> {
    fn new(capacity: usize, next: usize, prev: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: slots.into_boxed_slice(),
            full: false,
            read: 0,
            write: 0,
            next,
            prev,
        }
    }
}

/// An unbounded FIFO queue over a growable cycle of fixed-size cells.
///
/// The ring starts with [`INITIAL_CELL_COUNT`] cells and grows one cell at
/// a time, only when saturated. Elements are read back in exactly the order
/// they were written, no matter how many grow steps happened in between.
///
/// # Example
///
/// ```
/// use plenum::GrowableRing;
///
/// let mut ring = GrowableRing::with_cell_capacity(4);
/// for i in 0..10 {
///     ring.write(i);
/// }
/// for i in 0..10 {
///     assert_eq!(ring.read(), Ok(i));
/// }
/// assert!(ring.is_empty());
/// ```
pub struct GrowableRing<T> {
    /// Cell arena; every cell is part of the cycle.
    cells: Vec<Cell<T>>,
    /// Arena index of the cell currently being drained.
    read_cell: usize,
    /// Arena index of the cell currently being filled.
    write_cell: usize,
    /// Slots per cell, fixed for the lifetime of the ring.
    cell_capacity: usize,
}

impl<T> Default for GrowableRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowableRing<T> {
    /// Creates a ring with the default cell capacity
    /// ([`DEFAULT_CELL_CAPACITY`]).
    #[must_use]
    pub fn new() -> Self {
        Self::with_cell_capacity(DEFAULT_CELL_CAPACITY)
    }

    /// Creates a ring whose cells each hold `cell_capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `cell_capacity` is zero.
    #[must_use]
    pub fn with_cell_capacity(cell_capacity: usize) -> Self {
        assert!(cell_capacity > 0, "cell capacity must be > 0");
        Self {
            cells: Self::initial_cells(cell_capacity),
            read_cell: 0,
            write_cell: 0,
            cell_capacity,
        }
    }

    /// Builds the minimal cycle of [`INITIAL_CELL_COUNT`] linked cells.
    fn initial_cells(cell_capacity: usize) -> Vec<Cell<T>> {
        (0..INITIAL_CELL_COUNT)
            .map(|i| {
                Cell::new(
                    cell_capacity,
                    (i + 1) % INITIAL_CELL_COUNT,
                    (i + INITIAL_CELL_COUNT - 1) % INITIAL_CELL_COUNT,
                )
            })
            .collect()
    }

    /// Appends a value. Never fails and never blocks.
    ///
    /// If the cell under the write cursor is still flagged full (the ring
    /// has no spare capacity anywhere), a grow step splices in one new cell
    /// first. Filling the current cell flags it full and advances the write
    /// position to the next cell in the cycle.
    pub fn write(&mut self, value: T) {
        if self.cells[self.write_cell].full {
            self.grow();
        }

        let capacity = self.cell_capacity;
        let cell = &mut self.cells[self.write_cell];
        cell.slots[cell.write] = Some(value);
        cell.write += 1;

        if cell.write == capacity {
            cell.write = 0;
            cell.full = true;
            self.write_cell = cell.next;
        }
    }

    /// Removes and returns the oldest value.
    ///
    /// Draining a cell completely clears its cursors and full flag and
    /// advances the read position to the next cell in the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyError`] if the ring holds no data.
    pub fn read(&mut self) -> Result<T, EmptyError> {
        if self.is_empty() {
            return Err(EmptyError);
        }

        let capacity = self.cell_capacity;
        let cell = &mut self.cells[self.read_cell];
        let value = cell.slots[cell.read]
            .take()
            .expect("slot under read cursor must be written");
        cell.read += 1;

        if cell.read == capacity {
            cell.read = 0;
            cell.full = false;
            self.read_cell = cell.next;
        }

        Ok(value)
    }

    /// Returns the oldest value without advancing any cursor.
    ///
    /// # Panics
    ///
    /// Panics if the ring is empty. Callers must check
    /// [`is_empty`](Self::is_empty) first; peeking an empty ring is a
    /// contract violation, not a runtime condition.
    #[must_use]
    pub fn peek(&self) -> &T {
        assert!(!self.is_empty(), "peek on an empty ring");
        let cell = &self.cells[self.read_cell];
        cell.slots[cell.read]
            .as_ref()
            .expect("slot under read cursor must be written")
    }

    /// Removes and returns the oldest value, treating emptiness as fatal.
    ///
    /// Equivalent to [`read`](Self::read) where the caller has already
    /// established non-emptiness.
    ///
    /// # Panics
    ///
    /// Panics if the ring is empty.
    pub fn pop(&mut self) -> T {
        match self.read() {
            Ok(value) => value,
            Err(EmptyError) => panic!("pop on an empty ring"),
        }
    }

    /// Returns `true` if the ring holds no data.
    ///
    /// Holds iff the read and write positions share a cell, the cursors
    /// coincide, and that cell is not flagged full.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let cell = &self.cells[self.read_cell];
        self.read_cell == self.write_cell && cell.read == cell.write && !cell.full
    }

    /// Total slot capacity: cell count times slots per cell.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.len() * self.cell_capacity
    }

    /// Number of cells currently in the cycle.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Slots per cell.
    #[must_use]
    pub fn cell_capacity(&self) -> usize {
        self.cell_capacity
    }

    /// Collapses the ring back to its initial cells, releasing the memory
    /// acquired by past growth.
    ///
    /// # Panics
    ///
    /// Panics if the ring is not empty. Resetting a ring with pending data
    /// is a contract violation.
    pub fn reset(&mut self) {
        assert!(self.is_empty(), "reset on a non-empty ring");
        // Dropping the old arena releases every cell acquired by growth.
        self.cells = Self::initial_cells(self.cell_capacity);
        self.read_cell = 0;
        self.write_cell = 0;
    }

    /// Splices one new cell into the cycle immediately before the write
    /// cell and repoints the write position at it.
    ///
    /// The new cell sits exactly where further writes would otherwise
    /// overwrite not-yet-drained data, so FIFO order is preserved. Only
    /// `write` may call this, at the single safe decision point (the write
    /// cell has just been entered and is still flagged full).
    fn grow(&mut self) {
        let index = self.cells.len();
        let write = self.write_cell;
        let prev = self.cells[write].prev;

        self.cells.push(Cell::new(self.cell_capacity, write, prev));
        self.cells[prev].next = index;
        self.cells[write].prev = index;
        self.write_cell = index;
    }
}

impl<T> fmt::Debug for GrowableRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableRing")
            .field("cell_count", &self.cell_count())
            .field("cell_capacity", &self.cell_capacity)
            .field("capacity", &self.capacity())
            .field("is_empty", &self.is_empty())
            .finish()
    }
}
