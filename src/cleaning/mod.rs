//! Cleaning module containing the reconciliation/deduplication engine
//!
//! The engine is a deterministic, single-pass batch transform over an
//! in-memory record set: normalize the raw export schema, extract refund
//! events, merge duplicate line items, net refunded quantities against the
//! original sale lines, and emit one canonical, sorted record set.

pub mod dedup;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod refunds;

pub use dedup::*;
pub use normalize::*;
pub use pipeline::*;
pub use reconcile::*;
pub use refunds::*;
