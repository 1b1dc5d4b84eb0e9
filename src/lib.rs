//! Client core for a spreadsheet-backed hook-intake dashboard.
//!
//! Locally entered records are inserted optimistically and reconciled
//! against periodically re-fetched server snapshots with a per-cycle
//! timestamp watermark; a pure engine derives the filtered, aggregated,
//! paginated view the presentation layer renders.
//!
//! # Examples
//!
//! Pure store + engine usage:
//! ```
//! use hookstock::{
//!     core::store::RecordStore,
//!     engine::{filter, filter::FilterState, page},
//!     record::RecordDraft,
//! };
//!
//! let mut store = RecordStore::new();
//! store.insert_pending(
//!     RecordDraft {
//!         date: "2024-05-01".to_string(),
//!         id: "M001".to_string(),
//!         quantity: "5".to_string(),
//!         ..RecordDraft::default()
//!     },
//!     100,
//! );
//!
//! let unified = store.unified();
//! let filtered = filter::apply(&unified, &FilterState::for_years(["2024"]));
//! assert_eq!(filter::total_quantity(&filtered), 5.0);
//! assert_eq!(page::paginate(&filtered, 20, 1).total_pages, 1);
//! ```
//!
//! Runtime usage against the HTTP backend:
//! ```no_run
//! use std::sync::Arc;
//!
//! use hookstock::{
//!     core::store::RecordStore,
//!     master::MasterCache,
//!     remote::http::HttpBackend,
//!     runtime::handle::{RuntimeConfig, spawn_dashboard},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = HttpBackend::new("https://script.example.com/exec").expect("backend");
//! let handle = spawn_dashboard(
//!     RecordStore::new(),
//!     MasterCache::new(),
//!     Some(Arc::new(backend)),
//!     RuntimeConfig::default(),
//! );
//! handle.set_years(["2024"]).await.expect("years");
//! handle.sync_now().await.expect("sync");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Persisted endpoint configuration.
pub mod config;
/// In-memory record partitions and watermark reconciliation.
pub mod core;
/// Pure filtering, aggregation, and pagination.
pub mod engine;
/// Master-data cache and suggestion derivation.
pub mod master;
/// Record and draft domain types.
pub mod record;
/// Backend trait, wire types, and the HTTP client.
pub mod remote;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
