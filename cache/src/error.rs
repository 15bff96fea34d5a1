use thiserror::Error;

/// Errors produced by the cache core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The cache was configured in a way that cannot produce a working cache,
  /// such as a capacity of zero.
  #[error("invalid cache configuration: {0}")]
  InvalidConfiguration(String),

  /// The key index and the recency list disagree. This is always a bug in
  /// the cache itself and is never retried.
  #[error("cache index and recency list are inconsistent: {0}")]
  InternalConsistency(String),

  /// A user-supplied eviction hook panicked. This error is contained at the
  /// hook boundary and logged; it never escapes item destruction.
  #[error("eviction hook failed: {0}")]
  HookFailure(String),
}

/// A specialized `Result` type for cache operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
