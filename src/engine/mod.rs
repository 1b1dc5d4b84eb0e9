//! Pure derivation layer: filtering, aggregation, pagination.

/// Predicate conjunction and quantity aggregation.
pub mod filter;
/// Stateless page slicing.
pub mod page;
