use thiserror::Error;

use crate::{
    core::indices::CoordIndex,
    record::{HookRecord, Origin, RecordDraft},
    types::{RowIndex, TimestampMs},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record has not been synchronized yet; sync before editing its quantity")]
    NotSynchronized,
    #[error("no confirmed record at ({year}, row {row_index})")]
    MissingCoordinate { year: String, row_index: RowIndex },
}

/// Two-partition record store: optimistically inserted pending records and
/// the last confirmed server snapshot. The unified view is pending (newest
/// first) followed by confirmed, so a fresh submission is visible at the top.
#[derive(Debug, Default)]
pub struct RecordStore {
    pending: Vec<HookRecord>,
    confirmed: Vec<HookRecord>,
    by_coord: CoordIndex,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pending(&mut self, draft: RecordDraft, created_ms: TimestampMs) -> HookRecord {
        let record = draft.into_pending(created_ms);
        self.pending.insert(0, record.clone());
        record
    }

    pub fn replace_confirmed(&mut self, rows: Vec<HookRecord>) {
        self.confirmed = rows
            .into_iter()
            .filter(|r| matches!(r.origin, Origin::Confirmed { .. }))
            .collect();

        self.by_coord.clear();
        for (idx, rec) in self.confirmed.iter().enumerate() {
            if let Some((year, row_index)) = rec.coordinate() {
                self.by_coord.insert((year.to_string(), row_index), idx);
            }
        }
    }

    /// Drops every pending record created at or before the watermark; those
    /// were candidates for inclusion in the fetch that produced the current
    /// snapshot. Strictly-later records survive until the next cycle.
    pub fn prune_pending_through(&mut self, watermark_ms: TimestampMs) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|rec| rec.created_ms().is_some_and(|t| t > watermark_ms));
        before - self.pending.len()
    }

    /// `watermark_ms` must have been sampled strictly before the fetch that
    /// produced `rows` was issued.
    pub fn apply_snapshot(&mut self, rows: Vec<HookRecord>, watermark_ms: TimestampMs) -> usize {
        self.replace_confirmed(rows);
        self.prune_pending_through(watermark_ms)
    }

    pub fn set_confirmed_quantity(
        &mut self,
        year: &str,
        row_index: RowIndex,
        quantity: &str,
    ) -> Result<(), StoreError> {
        let idx = self
            .by_coord
            .get(&(year.to_string(), row_index))
            .copied()
            .ok_or_else(|| StoreError::MissingCoordinate {
                year: year.to_string(),
                row_index,
            })?;
        self.confirmed[idx].quantity = quantity.to_string();
        Ok(())
    }

    pub fn pending(&self) -> &[HookRecord] {
        &self.pending
    }

    pub fn confirmed(&self) -> &[HookRecord] {
        &self.confirmed
    }

    pub fn unified(&self) -> Vec<HookRecord> {
        let mut out = Vec::with_capacity(self.pending.len() + self.confirmed.len());
        out.extend(self.pending.iter().cloned());
        out.extend(self.confirmed.iter().cloned());
        out
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn confirmed_len(&self) -> usize {
        self.confirmed.len()
    }
}
