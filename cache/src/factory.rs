use crate::item::{AtomicOps, Item, LockBasedItem, LockFreeItem};
use crate::lock_strategy::Workload;

/// A value that can be stored in the cache.
///
/// Every value type gets a lock-based item by default. Types that are
/// `Copy + Eq` can opt into lock-free storage by returning their atomic
/// operations from [`atomic_ops`], and other `Copy` types of 32 or 64 bits
/// can do the same through a bit-pattern layout; whether the lock-free variant is actually
/// used is still decided at runtime, per platform.
///
/// ```
/// use writeback_cache::CacheValue;
///
/// #[derive(Clone, PartialEq)]
/// struct Profile {
///   name: String,
/// }
///
/// impl CacheValue for Profile {}
/// ```
///
/// [`atomic_ops`]: CacheValue::atomic_ops
pub trait CacheValue: Clone + PartialEq + Send + Sync + 'static {
  /// Atomic operations for this type, if it can live in an `AtomicCell`.
  fn atomic_ops() -> Option<AtomicOps<Self>> {
    None
  }
}

macro_rules! lock_free_candidates {
  ($($ty:ty),* $(,)?) => {
    $(
      impl CacheValue for $ty {
        fn atomic_ops() -> Option<AtomicOps<Self>> {
          Some(AtomicOps::new())
        }
      }
    )*
  };
}

lock_free_candidates!(
  u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char
);

// Floats are not `Eq`, so they live in the atomic cell as their bit pattern.
impl CacheValue for f32 {
  fn atomic_ops() -> Option<AtomicOps<Self>> {
    Some(AtomicOps::bits32(f32::to_bits, f32::from_bits))
  }
}

impl CacheValue for f64 {
  fn atomic_ops() -> Option<AtomicOps<Self>> {
    Some(AtomicOps::bits64(f64::to_bits, f64::from_bits))
  }
}

impl CacheValue for String {}
impl CacheValue for Box<str> {}
impl<T: CacheValue> CacheValue for Vec<T> {}
impl<T: CacheValue> CacheValue for Option<T> {}

/// Whether items of type `V` would be built lock-free on this platform.
///
/// This is a runtime query: the same type may be lock-free on one target or
/// alignment and not on another.
pub fn is_lock_free<V: CacheValue>() -> bool {
  V::atomic_ops().is_some_and(|ops| ops.is_lock_free())
}

/// Builds an item holding `value`.
///
/// A lock-free item is produced when the value type provides atomic
/// operations and the platform's atomic cell for its layout is lock-free; the
/// workload is irrelevant in that case. Otherwise a lock-based item is built
/// with the strategy matching `workload`.
pub fn make_item<V: CacheValue>(value: V, workload: Workload) -> Item<V> {
  match V::atomic_ops() {
    Some(ops) if ops.is_lock_free() => Item::LockFree(LockFreeItem::new(value, ops)),
    _ => Item::LockBased(LockBasedItem::new(value, workload)),
  }
}
