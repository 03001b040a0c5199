// Optional-counter reads: absent path or failed read yields the caller's
// default, never an error. Version drift in the stats directory stays
// contained here.

use std::collections::HashSet;

use super::{Aggregation, StatsSegment};

/// Wraps one stats segment plus the directory captured at the start of the
/// sampling pass. The directory is captured once so every read in a pass
/// sees the same path set.
pub struct StatAccessor<'a, S: StatsSegment> {
    stats: &'a mut S,
    directory: &'a HashSet<String>,
}

impl<'a, S: StatsSegment> StatAccessor<'a, S> {
    pub fn new(stats: &'a mut S, directory: &'a HashSet<String>) -> Self {
        Self { stats, directory }
    }

    /// Aggregate value of `path` for the interface at `index`, or `default`
    /// when the path is absent from the directory or the read fails.
    pub async fn get(&mut self, path: &str, index: usize, agg: Aggregation, default: u64) -> u64 {
        if !self.directory.contains(path) {
            tracing::debug!(path, default, "stats path not available, using default");
            return default;
        }
        match self.stats.read(path, index, agg).await {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(path, index, error = %e, "stat read failed, using default");
                default
            }
        }
    }
}
