//! Cache Module
//!
//! Provides the per-feed record cache with TTL expiration, bounded queues,
//! write-order eviction and a memoized aggregate view.

mod aggregate;
mod entry;
mod queue;
mod record;
mod stats;
mod store;
mod write_order;


// Re-export public types
pub use aggregate::{AggregateView, Snapshot};
pub use entry::CacheEntry;
pub use queue::FeedQueue;
pub use record::{ContentRecord, EncodedRecord};
pub use stats::CacheStats;
pub use store::FeedCache;
pub use write_order::WriteOrder;

// == Public Constants ==
/// Maximum allowed feed key length in bytes
pub const MAX_KEY_LENGTH: usize = 64;
