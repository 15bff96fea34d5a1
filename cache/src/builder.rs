use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::factory::CacheValue;
use crate::hook::{EvictionHook, NoopHook};
use crate::lock_strategy::Workload;

use core::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// A builder for [`Cache`] instances.
///
/// ```
/// use writeback_cache::CacheBuilder;
///
/// let cache = CacheBuilder::<u32, String>::with_default_value("NODATA".to_string())
///   .capacity(128)
///   .write_heavy(true)
///   .eviction_hook(|key: &u32, value: String| println!("{key} -> {value}"))
///   .build()
///   .unwrap();
///
/// assert_eq!(cache.access(7).unwrap().read(), "NODATA");
/// ```
pub struct CacheBuilder<K, V: CacheValue> {
  capacity: usize,
  workload: Workload,
  default_value: V,
  hook: Option<Arc<dyn EvictionHook<K, V>>>,
  _key_marker: PhantomData<K>,
}

impl<K, V: CacheValue + fmt::Debug> fmt::Debug for CacheBuilder<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("capacity", &self.capacity)
      .field("workload", &self.workload)
      .field("default_value", &self.default_value)
      .field("has_hook", &self.hook.is_some())
      .finish()
  }
}

impl<K, V: CacheValue + Default> CacheBuilder<K, V> {
  /// Starts a builder whose items default to `V::default()`.
  pub fn new() -> Self {
    Self::with_default_value(V::default())
  }
}

impl<K, V: CacheValue + Default> Default for CacheBuilder<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V: CacheValue> CacheBuilder<K, V> {
  /// Starts a builder whose items hold `default_value` until first written.
  pub fn with_default_value(default_value: V) -> Self {
    Self {
      capacity: 0,
      workload: Workload::default(),
      default_value,
      hook: None,
      _key_marker: PhantomData,
    }
  }

  /// Sets the maximum number of tracked entries. Must be non-zero.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets the lock strategy for items that cannot be stored lock-free.
  pub fn workload(mut self, workload: Workload) -> Self {
    self.workload = workload;
    self
  }

  /// Shorthand for [`workload`](Self::workload): `true` selects
  /// [`Workload::WriteHeavy`], `false` [`Workload::ReadHeavy`].
  pub fn write_heavy(self, write_heavy: bool) -> Self {
    self.workload(Workload::from_write_heavy(write_heavy))
  }

  /// Sets the value new items hold until first written.
  pub fn default_value(mut self, value: V) -> Self {
    self.default_value = value;
    self
  }

  /// Sets the hook run when the last handle to an item is released.
  pub fn eviction_hook<Hook>(mut self, hook: Hook) -> Self
  where
    Hook: EvictionHook<K, V> + 'static,
  {
    self.hook = Some(Arc::new(hook));
    self
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<()> {
    if self.capacity == 0 {
      return Err(Error::InvalidConfiguration(format!(
        "a {} cache needs a capacity of at least one item",
        self.workload
      )));
    }
    Ok(())
  }

  pub fn build(self) -> Result<Cache<K, V>>
  where
    K: Eq + Hash + Clone + Send + Sync + 'static,
  {
    self.validate()?;

    tracing::debug!(
      capacity = self.capacity,
      workload = %self.workload,
      has_hook = self.hook.is_some(),
      "building cache"
    );

    let hook = self.hook.unwrap_or_else(|| Arc::new(NoopHook));
    Ok(Cache::from_parts(
      self.capacity,
      self.default_value,
      self.workload,
      hook,
    ))
  }
}
