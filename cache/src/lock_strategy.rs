use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// The expected access pattern of a value, used to pick a [`LockStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workload {
  /// Reads dominate: use a reader/writer lock so readers proceed in parallel.
  #[default]
  ReadHeavy,
  /// Writes dominate or contention is low: use a plain mutex, every access
  /// excludes every other.
  WriteHeavy,
}

impl Workload {
  /// Maps the classic `write_heavy` flag onto a workload.
  pub fn from_write_heavy(write_heavy: bool) -> Self {
    if write_heavy {
      Workload::WriteHeavy
    } else {
      Workload::ReadHeavy
    }
  }

  pub fn is_write_heavy(self) -> bool {
    matches!(self, Workload::WriteHeavy)
  }
}

impl fmt::Display for Workload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Workload::ReadHeavy => write!(f, "read heavy"),
      Workload::WriteHeavy => write!(f, "write heavy"),
    }
  }
}

/// Shared or exclusive access to a protected value.
///
/// Both variants hand out the same pair of guards, so callers are written
/// once against `acquire_shared` / `acquire_exclusive` and the exclusion
/// primitive is picked when the strategy is built.
pub enum LockStrategy<T> {
  /// Backed by a reader/writer lock. Any number of shared guards may be held
  /// at once; an exclusive guard excludes everything else.
  ReadHeavy(RwLock<T>),
  /// Backed by a single mutex. Shared and exclusive requests both take full
  /// exclusion.
  WriteHeavy(Mutex<T>),
}

impl<T> LockStrategy<T> {
  pub fn new(value: T, workload: Workload) -> Self {
    match workload {
      Workload::ReadHeavy => LockStrategy::ReadHeavy(RwLock::new(value)),
      Workload::WriteHeavy => LockStrategy::WriteHeavy(Mutex::new(value)),
    }
  }

  pub fn workload(&self) -> Workload {
    match self {
      LockStrategy::ReadHeavy(_) => Workload::ReadHeavy,
      LockStrategy::WriteHeavy(_) => Workload::WriteHeavy,
    }
  }

  /// Blocks until shared access is granted.
  #[inline]
  pub fn acquire_shared(&self) -> SharedGuard<'_, T> {
    match self {
      LockStrategy::ReadHeavy(lock) => SharedGuard::Read(lock.read()),
      LockStrategy::WriteHeavy(lock) => SharedGuard::Exclusive(lock.lock()),
    }
  }

  /// Blocks until exclusive access is granted.
  #[inline]
  pub fn acquire_exclusive(&self) -> ExclusiveGuard<'_, T> {
    match self {
      LockStrategy::ReadHeavy(lock) => ExclusiveGuard::Write(lock.write()),
      LockStrategy::WriteHeavy(lock) => ExclusiveGuard::Exclusive(lock.lock()),
    }
  }

  /// Attempts shared access without blocking.
  pub fn try_acquire_shared(&self) -> Option<SharedGuard<'_, T>> {
    match self {
      LockStrategy::ReadHeavy(lock) => lock.try_read().map(SharedGuard::Read),
      LockStrategy::WriteHeavy(lock) => lock.try_lock().map(SharedGuard::Exclusive),
    }
  }

  /// Attempts exclusive access without blocking.
  pub fn try_acquire_exclusive(&self) -> Option<ExclusiveGuard<'_, T>> {
    match self {
      LockStrategy::ReadHeavy(lock) => lock.try_write().map(ExclusiveGuard::Write),
      LockStrategy::WriteHeavy(lock) => lock.try_lock().map(ExclusiveGuard::Exclusive),
    }
  }

  pub fn into_inner(self) -> T {
    match self {
      LockStrategy::ReadHeavy(lock) => lock.into_inner(),
      LockStrategy::WriteHeavy(lock) => lock.into_inner(),
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for LockStrategy<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LockStrategy::ReadHeavy(lock) => f.debug_tuple("ReadHeavy").field(lock).finish(),
      LockStrategy::WriteHeavy(lock) => f.debug_tuple("WriteHeavy").field(lock).finish(),
    }
  }
}

/// RAII guard for shared access. Released when dropped.
#[must_use = "if unused the lock is released immediately"]
pub enum SharedGuard<'a, T> {
  Read(RwLockReadGuard<'a, T>),
  Exclusive(MutexGuard<'a, T>),
}

impl<'a, T> Deref for SharedGuard<'a, T> {
  type Target = T;
  fn deref(&self) -> &Self::Target {
    match self {
      SharedGuard::Read(guard) => guard,
      SharedGuard::Exclusive(guard) => guard,
    }
  }
}

/// RAII guard for exclusive access. Released when dropped.
#[must_use = "if unused the lock is released immediately"]
pub enum ExclusiveGuard<'a, T> {
  Write(RwLockWriteGuard<'a, T>),
  Exclusive(MutexGuard<'a, T>),
}

impl<'a, T> Deref for ExclusiveGuard<'a, T> {
  type Target = T;
  fn deref(&self) -> &Self::Target {
    match self {
      ExclusiveGuard::Write(guard) => guard,
      ExclusiveGuard::Exclusive(guard) => guard,
    }
  }
}

impl<'a, T> DerefMut for ExclusiveGuard<'a, T> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    match self {
      ExclusiveGuard::Write(guard) => guard,
      ExclusiveGuard::Exclusive(guard) => guard,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn workload_from_flag() {
    assert_eq!(Workload::from_write_heavy(false), Workload::ReadHeavy);
    assert_eq!(Workload::from_write_heavy(true), Workload::WriteHeavy);
    assert_eq!(Workload::default(), Workload::ReadHeavy);
  }

  #[test]
  fn strategy_matches_workload() {
    assert_eq!(LockStrategy::new(1, Workload::ReadHeavy).workload(), Workload::ReadHeavy);
    assert_eq!(LockStrategy::new(1, Workload::WriteHeavy).workload(), Workload::WriteHeavy);
  }

  #[test]
  fn read_heavy_allows_concurrent_shared_guards() {
    let lock = LockStrategy::new(7, Workload::ReadHeavy);
    let first = lock.acquire_shared();
    let second = lock.try_acquire_shared();
    assert!(second.is_some(), "A second reader should get in");
    assert!(
      lock.try_acquire_exclusive().is_none(),
      "A writer must wait for readers"
    );
    assert_eq!(*first + *second.unwrap(), 14);
  }

  #[test]
  fn read_heavy_exclusive_blocks_readers() {
    let lock = LockStrategy::new(String::from("a"), Workload::ReadHeavy);
    let mut guard = lock.acquire_exclusive();
    guard.push('b');
    assert!(lock.try_acquire_shared().is_none());
    drop(guard);
    assert_eq!(&*lock.acquire_shared(), "ab");
  }

  #[test]
  fn write_heavy_shared_guards_exclude_each_other() {
    let lock = LockStrategy::new(0u32, Workload::WriteHeavy);
    let shared = lock.acquire_shared();
    assert!(lock.try_acquire_shared().is_none());
    assert!(lock.try_acquire_exclusive().is_none());
    drop(shared);
    assert!(lock.try_acquire_shared().is_some());
  }

  #[test]
  fn guards_release_on_unwind() {
    let lock = std::sync::Arc::new(LockStrategy::new(1, Workload::WriteHeavy));
    let cloned = lock.clone();
    let result = std::thread::spawn(move || {
      let mut guard = cloned.acquire_exclusive();
      *guard = 2;
      panic!("worker died holding the guard");
    })
    .join();
    assert!(result.is_err());
    // parking_lot locks do not poison, the guard was dropped during unwinding.
    assert_eq!(*lock.acquire_shared(), 2);
  }

  #[test]
  fn into_inner_returns_value() {
    let lock = LockStrategy::new(vec![1, 2], Workload::ReadHeavy);
    lock.acquire_exclusive().push(3);
    assert_eq!(lock.into_inner(), vec![1, 2, 3]);
  }
}
