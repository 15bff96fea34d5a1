use crate::builder::CacheBuilder;
use crate::error::Result;
use crate::factory::{make_item, CacheValue};
use crate::handle::ItemHandle;
use crate::hook::EvictionHook;
use crate::lock_strategy::Workload;
use crate::lru_list::LruList;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// A fixed-capacity, thread-safe least-recently-used cache of [`Item`]s.
///
/// [`access`] returns a shared [`ItemHandle`]; reads and writes through the
/// handle never take the cache's lock. When the last handle to an item is
/// released (the cache's own, after eviction, or a caller's, whichever comes
/// last) the eviction hook runs once with the item's key and final value.
///
/// Dropping the cache releases every tracked item.
///
/// [`Item`]: crate::Item
/// [`access`]: Cache::access
pub struct Cache<K: Eq + Hash + Clone, V: CacheValue> {
  capacity: usize,
  default_value: V,
  workload: Workload,
  hook: Arc<dyn EvictionHook<K, V>>,
  entries: Mutex<LruList<K, ItemHandle<K, V>>>,
}

impl<K, V> Cache<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: CacheValue + Default,
{
  /// Creates a read-heavy cache whose items start at `V::default()`.
  pub fn new<Hook>(capacity: usize, hook: Hook) -> Result<Self>
  where
    Hook: EvictionHook<K, V> + 'static,
  {
    CacheBuilder::new()
      .capacity(capacity)
      .eviction_hook(hook)
      .build()
  }
}

impl<K, V> Cache<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: CacheValue,
{
  pub(crate) fn from_parts(
    capacity: usize,
    default_value: V,
    workload: Workload,
    hook: Arc<dyn EvictionHook<K, V>>,
  ) -> Self {
    Self {
      capacity,
      default_value,
      workload,
      hook,
      entries: Mutex::new(LruList::with_capacity(capacity)),
    }
  }

  /// Returns the item for `key`, creating it if needed, and marks it as the
  /// most recently used.
  ///
  /// If the key is not tracked and the cache is full, the least recently used
  /// entry is evicted first. Eviction only stops tracking that item; it is
  /// destroyed, and its hook run, once no caller holds a handle to it either.
  /// A newly created item holds the cache's default value.
  ///
  /// Fails only with [`Error::InternalConsistency`], which signals a bug in
  /// the cache rather than a transient condition.
  ///
  /// [`Error::InternalConsistency`]: crate::Error::InternalConsistency
  pub fn access(&self, key: K) -> Result<ItemHandle<K, V>> {
    let mut entries = self.entries.lock();

    if let Some(handle) = entries.promote(&key)? {
      return Ok(handle.clone());
    }

    let evicted = if entries.len() >= self.capacity {
      entries.pop_back()?
    } else {
      None
    };

    let item = make_item(self.default_value.clone(), self.workload);
    tracing::trace!(lock_free = item.is_lock_free(), tracked = entries.len(), "created item");
    let handle = ItemHandle::new(key.clone(), item, Arc::clone(&self.hook));
    entries.push_front(key, handle.clone())?;
    drop(entries);

    // Released outside the structural lock: if this was the last handle the
    // hook runs here, and it may do slow I/O.
    if let Some((_, victim)) = evicted {
      tracing::trace!(
        holders = victim.handle_count() - 1,
        "evicted least recently used item"
      );
      drop(victim);
    }

    Ok(handle)
  }

  /// Returns `true` if `key` is currently tracked. Does not affect recency.
  pub fn contains(&self, key: &K) -> bool {
    self.entries.lock().contains(key)
  }

  /// Number of tracked entries. Never exceeds [`capacity`](Cache::capacity).
  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn workload(&self) -> Workload {
    self.workload
  }

  /// The value new items start with.
  pub fn default_value(&self) -> &V {
    &self.default_value
  }

  /// Tracked keys from most to least recently used.
  pub fn keys_by_recency(&self) -> Vec<K> {
    self.entries.lock().keys()
  }
}

impl<K: Eq + Hash + Clone, V: CacheValue> fmt::Debug for Cache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cache")
      .field("capacity", &self.capacity)
      .field("workload", &self.workload)
      .field("len", &self.entries.lock().len())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hook::NoopHook;

  #[test]
  fn zero_capacity_is_rejected() {
    let err = Cache::<i32, String>::new(0, NoopHook).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidConfiguration(_)));
  }

  #[test]
  fn repeated_access_returns_same_item() {
    let cache = Cache::<i32, u64>::new(2, NoopHook).unwrap();
    let first = cache.access(1).unwrap();
    let second = cache.access(1).unwrap();
    assert!(first.ptr_eq(&second));
    // Two caller handles plus the cache's own.
    assert_eq!(first.handle_count(), 3);
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn eviction_keeps_len_at_capacity() {
    let cache = Cache::<i32, u64>::new(3, NoopHook).unwrap();
    for key in 0..10 {
      cache.access(key).unwrap();
      assert!(cache.len() <= 3);
    }
    assert_eq!(cache.keys_by_recency(), vec![9, 8, 7]);
    assert!(!cache.contains(&0));
  }

  #[test]
  fn access_reports_corrupted_index_on_hit() {
    let cache = Cache::<i32, u64>::new(4, NoopHook).unwrap();
    cache.access(1).unwrap();
    cache.access(2).unwrap();
    {
      let mut entries = cache.entries.lock();
      let index_of_two = entries.lookup[&2];
      entries.lookup.insert(1, index_of_two);
    }

    let err = cache.access(1).unwrap_err();
    assert!(matches!(err, crate::Error::InternalConsistency(_)));
    assert_eq!(cache.len(), 2, "A failed access leaves the entries alone");
  }

  #[test]
  fn access_reports_corrupted_index_on_eviction() {
    let cache = Cache::<i32, u64>::new(2, NoopHook).unwrap();
    cache.access(1).unwrap();
    cache.access(2).unwrap();
    // Key 1 is the eviction victim; drop it from the index only.
    cache.entries.lock().lookup.remove(&1);

    let err = cache.access(3).unwrap_err();
    assert!(matches!(err, crate::Error::InternalConsistency(_)));
    assert!(!cache.contains(&3));
  }
}
