use crate::error::{Error, Result};

use writeback_cache::CacheValue;

/// A value type the driver can keep in the cache and in the item file.
///
/// Every cached item starts out [`unresolved`](StoredValue::unresolved): the
/// first reader to see that sentinel loads the line from disk and swaps it in.
pub trait StoredValue: CacheValue {
  /// Sentinel held by items that have not been loaded or written yet.
  fn unresolved() -> Self;

  /// Parses a line of the item file, or a value from a writer input.
  fn decode(text: &str) -> Result<Self>;

  /// The line to persist for this value. `None` for the sentinel, which
  /// must never reach the file.
  fn encode(&self) -> Option<String>;

  /// How a cache hit is reported in reader output.
  fn render(&self) -> String;
}

const NO_DATA: &str = "NODATA";

impl StoredValue for String {
  fn unresolved() -> Self {
    NO_DATA.to_string()
  }

  fn decode(text: &str) -> Result<Self> {
    Ok(text.to_string())
  }

  fn encode(&self) -> Option<String> {
    (self.as_str() != NO_DATA).then(|| self.clone())
  }

  fn render(&self) -> String {
    self.clone()
  }
}

// An empty line is stored as the smallest positive float; the sentinel sits
// one epsilon above it.
const EMPTY_LINE: f32 = f32::MIN_POSITIVE;
const UNRESOLVED_FLOAT: f32 = f32::MIN_POSITIVE + f32::EPSILON;

impl StoredValue for f32 {
  fn unresolved() -> Self {
    UNRESOLVED_FLOAT
  }

  fn decode(text: &str) -> Result<Self> {
    if text.is_empty() {
      return Ok(EMPTY_LINE);
    }
    text
      .trim()
      .parse::<f32>()
      .map_err(|_| Error::InvalidFloat(text.to_string()))
  }

  fn encode(&self) -> Option<String> {
    if *self == UNRESOLVED_FLOAT {
      None
    } else if *self == EMPTY_LINE {
      Some(String::new())
    } else {
      Some(self.render())
    }
  }

  fn render(&self) -> String {
    format!("{self:.6}")
  }
}
