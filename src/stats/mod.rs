//! Rolling request statistics and TTL-anchor tracking.
//!
//! One [`StatsAggregator`] is shared by every worker for the lifetime of a
//! run. Workers record request outcomes around each outbound call; the
//! reporting step reads a consistent summary once traffic has stopped.
mod aggregator;
mod percentile;

#[cfg(test)]
mod tests;

pub use aggregator::{StatsAggregator, StatsSummary};
