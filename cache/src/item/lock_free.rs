use crossbeam_utils::atomic::AtomicCell;
use std::fmt;

/// How a value type is laid out in a [`LockFreeItem`].
///
/// `AtomicCell` only offers `load` and `compare_exchange` for `Copy + Eq`
/// types, so the operations are captured as plain function pointers when the
/// value type is known to satisfy those bounds. That keeps [`Item`] free of
/// the bounds and lets the variant be chosen at runtime.
///
/// Types that are `Copy` but not `Eq`, like the floats, are stored as their
/// bit pattern instead (see [`bits32`](AtomicOps::bits32) and
/// [`bits64`](AtomicOps::bits64)). Their `compare_exchange` compares bits,
/// so a NaN matches an identical NaN and `0.0` does not match `-0.0`.
///
/// [`Item`]: crate::Item
pub struct AtomicOps<V> {
  repr: Repr<V>,
}

enum Repr<V> {
  Native {
    load: fn(&AtomicCell<V>) -> V,
    compare_exchange: fn(&AtomicCell<V>, V, V) -> Result<V, V>,
  },
  Bits32 {
    to_bits: fn(V) -> u32,
    from_bits: fn(u32) -> V,
  },
  Bits64 {
    to_bits: fn(V) -> u64,
    from_bits: fn(u64) -> V,
  },
}

impl<V: Copy + Eq> AtomicOps<V> {
  pub fn new() -> Self {
    Self {
      repr: Repr::Native {
        load: AtomicCell::load,
        compare_exchange: AtomicCell::compare_exchange,
      },
    }
  }
}

impl<V: Copy + Eq> Default for AtomicOps<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> AtomicOps<V> {
  /// Stores values as a `u32` bit pattern.
  pub fn bits32(to_bits: fn(V) -> u32, from_bits: fn(u32) -> V) -> Self {
    Self {
      repr: Repr::Bits32 { to_bits, from_bits },
    }
  }

  /// Stores values as a `u64` bit pattern.
  pub fn bits64(to_bits: fn(V) -> u64, from_bits: fn(u64) -> V) -> Self {
    Self {
      repr: Repr::Bits64 { to_bits, from_bits },
    }
  }

  /// Whether the atomic cell backing this layout is lock-free on this
  /// platform.
  pub fn is_lock_free(&self) -> bool {
    match self.repr {
      Repr::Native { .. } => AtomicCell::<V>::is_lock_free(),
      Repr::Bits32 { .. } => AtomicCell::<u32>::is_lock_free(),
      Repr::Bits64 { .. } => AtomicCell::<u64>::is_lock_free(),
    }
  }
}

impl<V> Clone for AtomicOps<V> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<V> Copy for AtomicOps<V> {}

impl<V> Clone for Repr<V> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<V> Copy for Repr<V> {}

impl<V> fmt::Debug for AtomicOps<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let layout = match self.repr {
      Repr::Native { .. } => "native",
      Repr::Bits32 { .. } => "bits32",
      Repr::Bits64 { .. } => "bits64",
    };
    f.debug_struct("AtomicOps").field("layout", &layout).finish()
  }
}

enum Cell<V> {
  Native {
    cell: AtomicCell<V>,
    load: fn(&AtomicCell<V>) -> V,
    compare_exchange: fn(&AtomicCell<V>, V, V) -> Result<V, V>,
  },
  Bits32 {
    cell: AtomicCell<u32>,
    to_bits: fn(V) -> u32,
    from_bits: fn(u32) -> V,
  },
  Bits64 {
    cell: AtomicCell<u64>,
    to_bits: fn(V) -> u64,
    from_bits: fn(u64) -> V,
  },
}

/// An item backed by a hardware atomic cell. No operation ever blocks.
pub struct LockFreeItem<V> {
  cell: Cell<V>,
}

impl<V> LockFreeItem<V> {
  /// Builds the item. Callers are expected to have confirmed
  /// [`AtomicOps::is_lock_free`]; otherwise `AtomicCell` falls back to its
  /// internal striped locks.
  pub fn new(value: V, ops: AtomicOps<V>) -> Self {
    let cell = match ops.repr {
      Repr::Native {
        load,
        compare_exchange,
      } => Cell::Native {
        cell: AtomicCell::new(value),
        load,
        compare_exchange,
      },
      Repr::Bits32 { to_bits, from_bits } => Cell::Bits32 {
        cell: AtomicCell::new(to_bits(value)),
        to_bits,
        from_bits,
      },
      Repr::Bits64 { to_bits, from_bits } => Cell::Bits64 {
        cell: AtomicCell::new(to_bits(value)),
        to_bits,
        from_bits,
      },
    };
    Self { cell }
  }

  #[inline]
  pub fn read(&self) -> V {
    match &self.cell {
      Cell::Native { cell, load, .. } => load(cell),
      Cell::Bits32 { cell, from_bits, .. } => from_bits(cell.load()),
      Cell::Bits64 { cell, from_bits, .. } => from_bits(cell.load()),
    }
  }

  #[inline]
  pub fn update(&self, value: V) {
    match &self.cell {
      Cell::Native { cell, .. } => cell.store(value),
      Cell::Bits32 { cell, to_bits, .. } => cell.store(to_bits(value)),
      Cell::Bits64 { cell, to_bits, .. } => cell.store(to_bits(value)),
    }
  }

  /// Stores `desired` iff the current value equals `expected`.
  #[inline]
  pub fn compare_exchange(&self, expected: V, desired: V) -> bool {
    match &self.cell {
      Cell::Native {
        cell,
        compare_exchange,
        ..
      } => compare_exchange(cell, expected, desired).is_ok(),
      Cell::Bits32 { cell, to_bits, .. } => cell.compare_exchange(to_bits(expected), to_bits(desired)).is_ok(),
      Cell::Bits64 { cell, to_bits, .. } => cell.compare_exchange(to_bits(expected), to_bits(desired)).is_ok(),
    }
  }
}

impl<V: fmt::Debug> fmt::Debug for LockFreeItem<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LockFreeItem")
      .field("value", &self.read())
      .finish()
  }
}
