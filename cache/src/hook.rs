use crate::error::Error;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// A callback run exactly once for every item the cache ever created, when
/// the last handle to that item is released.
///
/// `on_evict` receives the item's key and the value it held at that moment:
/// the last value written, or the cache's default value if it was never
/// written. This can happen long after the item left the cache if a caller
/// kept a handle, so the value may be newer than it was at eviction time.
///
/// Hooks must not panic. A panic is caught at the call site, reported as
/// [`Error::HookFailure`] through `tracing`, and otherwise ignored.
pub trait EvictionHook<K, V>: Send + Sync {
  fn on_evict(&self, key: &K, value: V);
}

impl<K, V, F> EvictionHook<K, V> for F
where
  F: Fn(&K, V) + Send + Sync,
{
  fn on_evict(&self, key: &K, value: V) {
    self(key, value)
  }
}

/// A hook that does nothing. Used when no write-back is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl<K, V> EvictionHook<K, V> for NoopHook {
  fn on_evict(&self, _key: &K, _value: V) {}
}

/// Runs `hook`, converting a panic into [`Error::HookFailure`].
pub(crate) fn invoke<K, V>(hook: &dyn EvictionHook<K, V>, key: &K, value: V) -> Result<(), Error> {
  panic::catch_unwind(AssertUnwindSafe(|| hook.on_evict(key, value)))
    .map_err(|payload| Error::HookFailure(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  #[test]
  fn closures_are_hooks() {
    let seen = Mutex::new(Vec::new());
    let hook = |key: &i32, value: String| seen.lock().unwrap().push((*key, value));
    invoke::<i32, String>(&hook, &3, "three".to_string()).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(3, "three".to_string())]);
  }

  #[test]
  fn panics_become_hook_failures() {
    let hook = |_: &i32, value: u8| panic!("disk full writing {value}");
    let err = invoke::<i32, u8>(&hook, &1, 9).unwrap_err();
    assert_eq!(err, Error::HookFailure("disk full writing 9".to_string()));

    let hook = |_: &i32, _: u8| panic!("static message");
    let err = invoke::<i32, u8>(&hook, &1, 9).unwrap_err();
    assert_eq!(err, Error::HookFailure("static message".to_string()));
  }

  #[test]
  fn noop_hook_accepts_anything() {
    assert!(invoke::<u64, String>(&NoopHook, &0, String::new()).is_ok());
  }
}
