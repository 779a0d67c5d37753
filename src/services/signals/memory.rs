//! Change-detection memory: last emitted summary per instrument.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::types::Summary;

/// Outcome of comparing a fresh summary against the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Same as the stored summary. Nothing was written.
    Unchanged,
    /// New or different. The fresh summary is now stored.
    Changed { previous: Option<Summary> },
}

impl Observation {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Last summary seen per instrument.
///
/// Keys are normalized to upper case. Entries never expire. Compare and
/// store run under the shard lock of the key, so concurrent callers with
/// the same summary see exactly one `Changed`.
#[derive(Default)]
pub struct SignalMemory {
    last: DashMap<String, Summary>,
}

impl SignalMemory {
    /// Create an empty memory.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn key(instrument: &str) -> String {
        instrument.trim().to_uppercase()
    }

    /// Record `summary` and report whether it differs from the stored one.
    pub fn observe(&self, instrument: &str, summary: &Summary) -> Observation {
        match self.last.entry(Self::key(instrument)) {
            Entry::Occupied(mut entry) => {
                if entry.get() == summary {
                    Observation::Unchanged
                } else {
                    let previous = entry.insert(summary.clone());
                    debug!("Summary changed for {}", entry.key());
                    Observation::Changed {
                        previous: Some(previous),
                    }
                }
            }
            Entry::Vacant(entry) => {
                debug!("First summary for {}", entry.key());
                entry.insert(summary.clone());
                Observation::Changed { previous: None }
            }
        }
    }

    /// True (and stores the summary) when it is new or different.
    pub fn should_emit(&self, instrument: &str, summary: &Summary) -> bool {
        self.observe(instrument, summary).is_changed()
    }

    /// Undo an emission that was not delivered.
    ///
    /// Restores `previous` only while `emitted` is still the stored value,
    /// so a newer summary written in the meantime is kept.
    pub fn rollback(&self, instrument: &str, emitted: &Summary, previous: Option<Summary>) {
        if let Entry::Occupied(mut entry) = self.last.entry(Self::key(instrument)) {
            if entry.get() != emitted {
                return;
            }
            match previous {
                Some(previous) => {
                    entry.insert(previous);
                }
                None => {
                    entry.remove();
                }
            }
        }
    }

    pub fn last_summary(&self, instrument: &str) -> Option<Summary> {
        self.last.get(&Self::key(instrument)).map(|s| s.clone())
    }

    /// Drop one instrument so its next summary is emitted.
    pub fn forget(&self, instrument: &str) -> Option<Summary> {
        self.last.remove(&Self::key(instrument)).map(|(_, s)| s)
    }

    /// Drop everything.
    pub fn reset(&self) {
        self.last.clear();
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
