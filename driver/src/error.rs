use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the driver's files and workloads.
#[derive(Debug, Error)]
pub enum Error {
  #[error("I/O error on '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Item file '{}' is empty", .0.display())]
  EmptyItemFile(PathBuf),

  #[error("Item file '{}' has no line {line}", path.display())]
  MissingLine { path: PathBuf, line: usize },

  #[error("Failed to convert key string '{0}' to an integer")]
  InvalidKey(String),

  #[error("Key 0 found in '{}', item indexing starts from 1", .0.display())]
  ZeroKey(PathBuf),

  #[error("No key-value delimiter (space) in line '{0}'")]
  MissingDelimiter(String),

  #[error("No value after the key in line '{0}'")]
  MissingValue(String),

  #[error("Failed to convert value '{0}' to a float, disable float optimization to proceed")]
  InvalidFloat(String),

  #[error("Cache error: {0}")]
  Cache(#[from] writeback_cache::Error),

  #[error("Worker for '{}' panicked: {message}", path.display())]
  WorkerPanicked { path: PathBuf, message: String },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }
}

/// A specialized `Result` type for driver operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
