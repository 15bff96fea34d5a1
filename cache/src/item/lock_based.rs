use crate::lock_strategy::{LockStrategy, Workload};

use std::fmt;

/// An item whose value is guarded by a [`LockStrategy`].
///
/// `read` takes a shared guard; `update` and `compare_exchange` take an
/// exclusive one. Guards live only for the duration of the call.
pub struct LockBasedItem<V> {
  value: LockStrategy<V>,
}

impl<V> LockBasedItem<V> {
  pub fn new(value: V, workload: Workload) -> Self {
    Self {
      value: LockStrategy::new(value, workload),
    }
  }

  pub fn workload(&self) -> Workload {
    self.value.workload()
  }

  #[inline]
  pub fn read(&self) -> V
  where
    V: Clone,
  {
    (*self.value.acquire_shared()).clone()
  }

  #[inline]
  pub fn update(&self, value: V) {
    *self.value.acquire_exclusive() = value;
  }

  /// Stores `desired` iff the current value equals `expected`.
  pub fn compare_exchange(&self, expected: &V, desired: V) -> bool
  where
    V: PartialEq,
  {
    let mut guard = self.value.acquire_exclusive();
    if *guard == *expected {
      *guard = desired;
      true
    } else {
      false
    }
  }
}

impl<V: fmt::Debug> fmt::Debug for LockBasedItem<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LockBasedItem")
      .field("value", &self.value)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn read_update_cas_read_heavy() {
    let item = LockBasedItem::new(String::from("NODATA"), Workload::ReadHeavy);
    assert_eq!(item.read(), "NODATA");

    assert!(!item.compare_exchange(&String::from("other"), "x".into()));
    assert_eq!(item.read(), "NODATA");

    assert!(item.compare_exchange(&String::from("NODATA"), "resolved".into()));
    assert_eq!(item.read(), "resolved");

    item.update(String::new());
    assert_eq!(item.read(), "");
  }

  #[test]
  fn write_heavy_behaves_the_same() {
    let item = LockBasedItem::new(vec![1u8], Workload::WriteHeavy);
    assert_eq!(item.workload(), Workload::WriteHeavy);
    item.update(vec![2, 3]);
    assert!(item.compare_exchange(&vec![2, 3], vec![]));
    assert!(item.read().is_empty());
  }
}
