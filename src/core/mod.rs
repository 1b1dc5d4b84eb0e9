//! In-memory record partitions and reconciliation.

/// Coordinate index aliases.
pub mod indices;
/// Pending/confirmed record store and watermark pruning.
pub mod store;
