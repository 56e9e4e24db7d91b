//! Per-run execution metrics.

/// Counters and timing collected during one plan run.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Wall-clock time for the whole run, in microseconds.
    pub total_us: u64,
    /// Number of leaf tiles executed.
    pub leaves: u64,
    /// Number of cell updates performed.
    pub cells: u64,
    /// Timesteps computed.
    pub timesteps: u64,
}
