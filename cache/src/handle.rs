use crate::factory::CacheValue;
use crate::hook::{self, EvictionHook};
use crate::item::Item;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// The allocation shared by every clone of an [`ItemHandle`].
///
/// Its `Drop` runs exactly once, when the last clone goes away, and is the
/// only place the eviction hook is called from.
struct TrackedItem<K, V: CacheValue> {
  key: K,
  item: Item<V>,
  hook: Arc<dyn EvictionHook<K, V>>,
}

impl<K, V: CacheValue> Drop for TrackedItem<K, V> {
  fn drop(&mut self) {
    let value = self.item.read();
    if let Err(err) = hook::invoke(self.hook.as_ref(), &self.key, value) {
      tracing::error!(error = %err, "eviction hook panicked, write-back for this item was skipped");
    }
  }
}

/// A shared, reference-counted handle to a cached [`Item`].
///
/// Handles are cheap to clone and can be sent to other threads. The item
/// stays alive, readable and writable, for as long as any handle exists,
/// even after the cache has evicted it. Dropping the last handle runs the
/// cache's eviction hook with the item's key and current value.
pub struct ItemHandle<K, V: CacheValue> {
  inner: Arc<TrackedItem<K, V>>,
}

impl<K, V: CacheValue> ItemHandle<K, V> {
  pub(crate) fn new(key: K, item: Item<V>, hook: Arc<dyn EvictionHook<K, V>>) -> Self {
    Self {
      inner: Arc::new(TrackedItem { key, item, hook }),
    }
  }

  /// The key this item was created for.
  pub fn key(&self) -> &K {
    &self.inner.key
  }

  pub fn item(&self) -> &Item<V> {
    &self.inner.item
  }

  /// Number of live handles to this item, including the one held by the
  /// cache while the item is still tracked.
  pub fn handle_count(&self) -> usize {
    Arc::strong_count(&self.inner)
  }

  /// Returns `true` if both handles point to the same item.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl<K, V: CacheValue> Clone for ItemHandle<K, V> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<K, V: CacheValue> Deref for ItemHandle<K, V> {
  type Target = Item<V>;

  fn deref(&self) -> &Self::Target {
    &self.inner.item
  }
}

impl<K: fmt::Debug, V: CacheValue + fmt::Debug> fmt::Debug for ItemHandle<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ItemHandle")
      .field("key", &self.inner.key)
      .field("item", &self.inner.item)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::factory::make_item;
  use crate::lock_strategy::Workload;
  use std::sync::Mutex;

  fn recording_hook() -> (Arc<Mutex<Vec<(u32, String)>>>, Arc<dyn EvictionHook<u32, String>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let hook: Arc<dyn EvictionHook<u32, String>> =
      Arc::new(move |key: &u32, value: String| sink.lock().unwrap().push((*key, value)));
    (seen, hook)
  }

  #[test]
  fn hook_fires_once_on_last_drop() {
    let (seen, hook) = recording_hook();
    let handle = ItemHandle::new(4, make_item(String::from("default"), Workload::ReadHeavy), hook);
    let other = handle.clone();
    assert_eq!(handle.handle_count(), 2);
    assert!(handle.ptr_eq(&other));

    other.update("written".into());
    drop(handle);
    assert!(seen.lock().unwrap().is_empty(), "A clone is still alive");

    drop(other);
    assert_eq!(*seen.lock().unwrap(), vec![(4, "written".to_string())]);
  }

  #[test]
  fn panicking_hook_does_not_escape_drop() {
    let hook: Arc<dyn EvictionHook<u32, u32>> = Arc::new(|_: &u32, _: u32| panic!("boom"));
    let handle = ItemHandle::new(1, make_item(0u32, Workload::ReadHeavy), hook);
    assert_eq!(*handle.key(), 1);
    drop(handle);
  }
}
