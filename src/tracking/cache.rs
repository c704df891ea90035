//! The last-reported record per unit.

use hashbrown::HashMap;

use super::ProcessRecord;

/// Remembers the last record reported for each unit so the tracker only
/// emits events on actual changes.
///
/// Two records count as the same when their pid and state agree; start
/// time and grouping are not compared, and the stored record is kept
/// as-is in that case.
#[derive(Debug, Default)]
pub struct StateCache {
    records: HashMap<String, ProcessRecord>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` under `unit` if it differs from what was last
    /// seen. Returns whether anything changed; the first observation of a
    /// unit always counts as a change.
    pub fn update(&mut self, unit: &str, record: &ProcessRecord) -> bool {
        if let Some(prev) = self.records.get(unit) {
            if prev.pid == record.pid && prev.state == record.state {
                return false;
            }
        }

        self.records.insert(unit.to_owned(), record.clone());
        true
    }

    /// The last stored record for `unit`, if any.
    pub fn get(&self, unit: &str) -> Option<&ProcessRecord> {
        self.records.get(unit)
    }
}
