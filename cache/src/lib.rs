//! A fixed-capacity, thread-safe LRU cache whose entries are updated
//! atomically without holding the cache lock, with a write-back hook that
//! fires when the last reference to an entry goes away.
//!
//! # Features
//! - **Two-level locking**: one mutex guards the recency structure; every
//!   item carries its own atomic or lock, so value traffic on hot keys never
//!   blocks lookups of other keys.
//! - **Lock-free items where possible**: `Copy + Eq` values that the platform
//!   can store in a native atomic are served without any lock, decided at
//!   runtime per type.
//! - **Selectable lock strategy**: other values use a reader/writer lock
//!   (read heavy) or a plain mutex (write heavy).
//! - **Exactly-once write-back**: the eviction hook runs once per item, when
//!   its last handle is dropped, even if that is long after eviction.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use writeback_cache::Cache;
//!
//! let flushed = Arc::new(Mutex::new(Vec::new()));
//! let sink = flushed.clone();
//! let cache = Cache::new(1, move |key: &u32, value: u64| {
//!   sink.lock().unwrap().push((*key, value));
//! })
//! .unwrap();
//!
//! cache.access(1).unwrap().update(10);
//! cache.access(2).unwrap();
//! assert_eq!(*flushed.lock().unwrap(), vec![(1, 10)]);
//! ```

// Public modules that form the API
pub mod builder;
pub mod cache;
pub mod error;
pub mod factory;
pub mod handle;
pub mod hook;
pub mod item;
pub mod lock_strategy;

// Internal, crate-only modules
mod lru_list;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{Error, Result};
pub use factory::{is_lock_free, make_item, CacheValue};
pub use handle::ItemHandle;
pub use hook::{EvictionHook, NoopHook};
pub use item::{AtomicOps, Item, LockBasedItem, LockFreeItem};
pub use lock_strategy::{ExclusiveGuard, LockStrategy, SharedGuard, Workload};
