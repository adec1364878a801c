//! Configuration for pipes and their elastic buffer.
//!
//! Two tunables control the elastic buffer: the per-cell slot count and the
//! number of cells a fresh (or reset) ring starts with. Both are fixed at
//! creation time for a given instance; changing a `PipeConfig` only affects
//! pipes created afterwards.

/// Default number of slots in each ring cell.
pub const DEFAULT_CELL_CAPACITY: usize = 1024;

/// Number of cells in a freshly created or reset ring.
pub const INITIAL_CELL_COUNT: usize = 2;

/// Default capacity of the bounded input and output endpoints.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for an unbounded pipe.
///
/// The input and output capacities size the two bounded channel endpoints;
/// the cell capacity sizes the segments of the elastic buffer bridging them.
#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// Capacity of the bounded input channel (producer side).
    pub input_capacity: usize,

    /// Capacity of the bounded output channel (consumer side).
    pub output_capacity: usize,

    /// Slots per cell in the elastic ring buffer.
    pub cell_capacity: usize,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            input_capacity: DEFAULT_CHANNEL_CAPACITY,
            output_capacity: DEFAULT_CHANNEL_CAPACITY,
            cell_capacity: DEFAULT_CELL_CAPACITY,
        }
    }
}

impl PipeConfig {
    /// Creates a configuration with distinct input and output capacities.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is zero.
    #[must_use]
    pub fn new(input_capacity: usize, output_capacity: usize) -> Self {
        assert!(input_capacity > 0, "input capacity must be > 0");
        assert!(output_capacity > 0, "output capacity must be > 0");
        Self {
            input_capacity,
            output_capacity,
            ..Default::default()
        }
    }

    /// Creates a configuration with the same capacity for both endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, capacity)
    }

    /// Sets the slots-per-cell capacity of the elastic buffer.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    #[must_use]
    pub fn cell_capacity(mut self, cell_capacity: usize) -> Self {
        assert!(cell_capacity > 0, "cell capacity must be > 0");
        self.cell_capacity = cell_capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipeConfig::default();
        assert_eq!(config.input_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.output_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.cell_capacity, DEFAULT_CELL_CAPACITY);
    }

    #[test]
    fn test_distinct_capacities() {
        let config = PipeConfig::new(10, 50).cell_capacity(8);
        assert_eq!(config.input_capacity, 10);
        assert_eq!(config.output_capacity, 50);
        assert_eq!(config.cell_capacity, 8);
    }

    #[test]
    fn test_with_capacity_sets_both() {
        let config = PipeConfig::with_capacity(32);
        assert_eq!(config.input_capacity, 32);
        assert_eq!(config.output_capacity, 32);
    }

    #[test]
    #[should_panic(expected = "input capacity must be > 0")]
    fn test_zero_input_capacity_panics() {
        let _ = PipeConfig::new(0, 1);
    }

    #[test]
    #[should_panic(expected = "cell capacity must be > 0")]
    fn test_zero_cell_capacity_panics() {
        let _ = PipeConfig::new(1, 1).cell_capacity(0);
    }
}
