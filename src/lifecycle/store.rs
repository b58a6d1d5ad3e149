use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StateError;
use crate::lifecycle::{LifecycleRecord, Status};

/// Process-lifetime cache of lifecycle records, keyed by composition id.
///
/// Mirrors the orchestrator for display; it is not the system of record and
/// is lost on restart. Records are never removed.
#[derive(Debug, Default)]
pub struct TrackingStore {
    // Map<CompositionId, (InsertionSeq, Record)>
    records: DashMap<String, (u64, LifecycleRecord)>,
    next_seq: AtomicU64,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a record as given.
    pub fn record(&self, record: LifecycleRecord) {
        match self.records.entry(record.composition_id.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = record,
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                entry.insert((seq, record));
            }
        }
    }

    /// Confirmation upsert: stamps the confirmation time and `Deployed`.
    pub fn track(&self, composition_id: &str, mut record: LifecycleRecord) -> LifecycleRecord {
        record.composition_id = composition_id.to_string();
        record.status = Status::Deployed;
        record.confirmed_at = Some(Utc::now());
        self.record(record.clone());
        record
    }

    pub fn get(&self, composition_id: &str) -> Option<LifecycleRecord> {
        self.records.get(composition_id).map(|entry| entry.1.clone())
    }

    /// All records in first-insertion order.
    pub fn list(&self) -> Vec<LifecycleRecord> {
        let mut entries: Vec<(u64, LifecycleRecord)> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Applies `f` to a tracked record and returns the updated copy.
    pub fn update<F>(&self, composition_id: &str, f: F) -> Result<LifecycleRecord, StateError>
    where
        F: FnOnce(&mut LifecycleRecord),
    {
        let mut entry = self
            .records
            .get_mut(composition_id)
            .ok_or_else(|| StateError::UnknownComposition(composition_id.to_string()))?;
        f(&mut entry.1);
        Ok(entry.1.clone())
    }

    /// Links an original record to the composition that replaced it.
    pub fn supersede(&self, composition_id: &str, new_composition_id: &str) -> Result<LifecycleRecord, StateError> {
        self.update(composition_id, |record| {
            record.superseded_by = Some(new_composition_id.to_string());
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
