//! Dump diagnostics tracking.
//!
//! This module provides thread-safe counters for the degraded-but-usable
//! outcomes of dumping and capture (truncated chains, omitted bodies, failed
//! decompression).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::DumpEvent;

/// Thread-safe diagnostics tracker.
///
/// Every [`DumpEvent`] is initialized to zero on creation. Share across tasks
/// with `Arc`.
#[derive(Debug)]
pub struct DumpStats {
    events: HashMap<DumpEvent, AtomicUsize>,
}

impl DumpStats {
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in DumpEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }
        DumpStats { events }
    }

    pub fn increment(&self, event: DumpEvent) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in DumpStats initialization.",
                event
            );
        }
    }

    /// Returns 0 for an event that is not in the map.
    pub fn get_count(&self, event: DumpEvent) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.events.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Logs every non-zero counter at info level.
    pub fn log_summary(&self) {
        for event in DumpEvent::iter() {
            let count = self.get_count(event);
            if count > 0 {
                log::info!("{}: {}", event, count);
            }
        }
    }
}

impl Default for DumpStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_dump_stats_initialization() {
        let stats = DumpStats::new();
        for event in DumpEvent::iter() {
            assert_eq!(stats.get_count(event), 0);
        }
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_dump_stats_increment() {
        let stats = DumpStats::new();
        stats.increment(DumpEvent::HopBodyOmitted);
        stats.increment(DumpEvent::HopBodyOmitted);
        stats.increment(DumpEvent::ChainTruncated);

        assert_eq!(stats.get_count(DumpEvent::HopBodyOmitted), 2);
        assert_eq!(stats.get_count(DumpEvent::ChainTruncated), 1);
        assert_eq!(stats.get_count(DumpEvent::DecompressionFailed), 0);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_dump_stats_concurrent_increments() {
        let stats = Arc::new(DumpStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.increment(DumpEvent::RedirectFollowed);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.get_count(DumpEvent::RedirectFollowed), 800);
    }
}
