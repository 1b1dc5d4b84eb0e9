//! Shared primitive aliases and small cross-module enums.

use serde::{Deserialize, Serialize};

/// Backend-assigned row position within a year segment (1-based, counting the header row).
pub type RowIndex = u32;
/// Milliseconds since the Unix epoch.
pub type TimestampMs = u64;

/// Master-data category driving one autocomplete field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MasterCategory {
    /// Pants hook reference codes.
    PantsCode,
    /// Shirt hook reference codes.
    ShirtCode,
    /// Hook colors.
    Color,
    /// Receiving groups.
    Group,
}

impl MasterCategory {
    /// Wire name used by the spreadsheet backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PantsCode => "pantsCode",
            Self::ShirtCode => "shirtCode",
            Self::Color => "color",
            Self::Group => "group",
        }
    }
}

/// Visible status of the manual sync path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Idle, last cycle (if any) settled.
    #[default]
    Ready,
    /// A manual cycle is in flight.
    Syncing,
    /// A manual cycle just finished; reverts to `Ready` after a fixed delay.
    Complete,
}
