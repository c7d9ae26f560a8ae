//! Registry of built and partially built structures (supports or devices).
//!
//! Only one unit of a given id can be under construction at a time, which is
//! what lets an interrupted build be resumed later by id alone.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructionRecord {
    pub built: u32,
    /// Ticks of progress on the unit currently under construction.
    pub in_progress: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ConstructionRegistry {
    records: BTreeMap<String, ConstructionRecord>,
}

impl ConstructionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_incomplete(&self, id: &str) -> bool {
        self.records
            .get(id)
            .map(|r| r.in_progress.is_some())
            .unwrap_or(false)
    }

    /// Progress of the incomplete unit, zero when none exists.
    pub fn progress(&self, id: &str) -> u32 {
        self.records
            .get(id)
            .and_then(|r| r.in_progress)
            .unwrap_or(0)
    }

    pub fn start_construction(&mut self, id: &str) {
        self.records.entry(id.to_string()).or_default().in_progress = Some(0);
    }

    pub fn increment_progress(&mut self, id: &str) {
        let record = self.records.entry(id.to_string()).or_default();
        record.in_progress = Some(record.in_progress.unwrap_or(0) + 1);
    }

    pub fn finish_construction(&mut self, id: &str) {
        let record = self.records.entry(id.to_string()).or_default();
        record.in_progress = None;
        record.built += 1;
    }

    pub fn built(&self, id: &str) -> u32 {
        self.records.get(id).map(|r| r.built).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConstructionRecord)> {
        self.records.iter()
    }
}
