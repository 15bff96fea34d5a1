use crate::error::Result;

use std::path::Path;

/// One unit of concurrent work driven line by line from an input file.
pub trait Worker: Send {
  /// Processes the next input line. Returns `Ok(false)` once input is
  /// exhausted.
  fn step(&mut self) -> Result<bool>;

  /// The input file this worker consumes.
  fn input_path(&self) -> &Path;
}
