//! Network boundary: backend trait, wire types, and errors.

/// Spreadsheet-backend HTTP client.
pub mod http;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    master::MasterEntry,
    record::{HookRecord, Origin, RecordDraft},
    types::RowIndex,
};

/// Errors crossing the network boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, timeout, or client construction problems.
    #[error("{0}")]
    Transport(String),
    /// A readable response carried a non-success status.
    #[error("backend rejected the request (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// A readable response body was not the expected JSON.
    #[error("invalid JSON from backend: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The configured endpoint URL could not be used.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// One stored row as returned by `getData`.
///
/// Spreadsheet cells come back as numbers or strings depending on how the
/// sheet coerced them, so every free-text field tolerates both.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedRow {
    /// Row coordinate within the year segment.
    pub row_index: RowIndex,
    /// Year segment name.
    #[serde(deserialize_with = "de_cell")]
    pub year: String,
    /// Stored display-format date text.
    #[serde(default, deserialize_with = "de_cell")]
    pub date: String,
    /// Intake code.
    #[serde(default, deserialize_with = "de_cell")]
    pub id: String,
    /// Order reference.
    #[serde(default, deserialize_with = "de_cell")]
    pub order: String,
    /// Pants hook code.
    #[serde(default, deserialize_with = "de_cell")]
    pub pants_code: String,
    /// Shirt hook code.
    #[serde(default, deserialize_with = "de_cell")]
    pub shirt_code: String,
    /// Hook color.
    #[serde(default, deserialize_with = "de_cell")]
    pub color: String,
    /// Receiving group.
    #[serde(default, deserialize_with = "de_cell")]
    pub group: String,
    /// Quantity cell, kept as text.
    #[serde(default, deserialize_with = "de_cell")]
    pub quantity: String,
}

fn de_cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

impl From<ConfirmedRow> for HookRecord {
    fn from(row: ConfirmedRow) -> Self {
        HookRecord {
            date: row.date,
            id: row.id,
            order: row.order,
            pants_code: row.pants_code,
            shirt_code: row.shirt_code,
            color: row.color,
            group: row.group,
            quantity: row.quantity,
            origin: Origin::Confirmed {
                year: row.year,
                row_index: row.row_index,
            },
        }
    }
}

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Operations the spreadsheet backend exposes.
///
/// The three write operations are fire-and-forget: implementations report
/// transport failures but do not inspect response bodies, matching the
/// opaque-response write contract. The runtime assumes success whenever the
/// call returns `Ok`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads every stored row across the requested year segments.
    async fn fetch_records(&self, years: &[String]) -> BackendResult<Vec<ConfirmedRow>>;

    /// Reads the master-data reference lists.
    async fn fetch_master_data(&self) -> BackendResult<Vec<MasterEntry>>;

    /// Appends one transaction row.
    async fn save_record(&self, draft: &RecordDraft) -> BackendResult<()>;

    /// Appends one master-data entry.
    async fn save_master_entry(&self, entry: &MasterEntry) -> BackendResult<()>;

    /// Overwrites the quantity cell at `(year, row_index)`.
    async fn update_quantity(
        &self,
        year: &str,
        row_index: RowIndex,
        quantity: &str,
    ) -> BackendResult<()>;
}
