//! Runtime event stream payloads.

use crate::types::{RowIndex, SyncStatus};

/// Events emitted from the single-writer runtime loop.
///
/// Background sync failures are deliberately absent: they are logged, never
/// surfaced, matching the silent automatic path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A draft was sent and optimistically inserted as pending.
    RecordSubmitted,
    /// A master-data entry was sent and appended to the cache.
    MasterEntrySaved,
    /// A confirmed record's quantity was patched in place.
    QuantityUpdated {
        /// Year segment of the patched row.
        year: String,
        /// Row coordinate of the patched row.
        row_index: RowIndex,
    },
    /// A manual sync cycle started.
    SyncStarted,
    /// A sync cycle applied its snapshot.
    SyncCompleted {
        /// True for the manual path.
        manual: bool,
        /// Confirmed records installed.
        confirmed: usize,
        /// Pending records pruned by the watermark.
        pruned: usize,
    },
    /// The visible status changed.
    StatusChanged {
        /// New visible status.
        status: SyncStatus,
    },
}
