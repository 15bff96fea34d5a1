pub mod lock_based;
pub mod lock_free;

use crate::factory::CacheValue;
use crate::lock_strategy::Workload;

pub use lock_based::LockBasedItem;
pub use lock_free::{AtomicOps, LockFreeItem};

use std::fmt;

/// A single cached value with atomic `read`, `update` and `compare_exchange`.
///
/// The variant is fixed when the item is built by [`make_item`], so every
/// operation is a single match on the hot path. Operations on one item are
/// atomic with respect to each other and never touch the cache's structural
/// lock.
///
/// [`make_item`]: crate::factory::make_item
pub enum Item<V> {
  LockFree(LockFreeItem<V>),
  LockBased(LockBasedItem<V>),
}

impl<V: CacheValue> Item<V> {
  /// Returns the current value.
  #[inline]
  pub fn read(&self) -> V {
    match self {
      Item::LockFree(item) => item.read(),
      Item::LockBased(item) => item.read(),
    }
  }

  /// Replaces the current value.
  #[inline]
  pub fn update(&self, value: V) {
    match self {
      Item::LockFree(item) => item.update(value),
      Item::LockBased(item) => item.update(value),
    }
  }

  /// Replaces the current value with `desired` only if it currently equals
  /// `expected`. Returns `true` if the swap happened.
  ///
  /// When several threads race from the same `expected` value exactly one of
  /// them observes `true`. Lock-free floats compare by bit pattern.
  #[inline]
  pub fn compare_exchange(&self, expected: &V, desired: V) -> bool {
    match self {
      Item::LockFree(item) => item.compare_exchange(expected.clone(), desired),
      Item::LockBased(item) => item.compare_exchange(expected, desired),
    }
  }
}

impl<V> Item<V> {
  pub fn is_lock_free(&self) -> bool {
    matches!(self, Item::LockFree(_))
  }

  /// The lock strategy in use, or `None` for a lock-free item.
  pub fn workload(&self) -> Option<Workload> {
    match self {
      Item::LockFree(_) => None,
      Item::LockBased(item) => Some(item.workload()),
    }
  }
}

impl<V: fmt::Debug> fmt::Debug for Item<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Item::LockFree(item) => item.fmt(f),
      Item::LockBased(item) => item.fmt(f),
    }
  }
}
